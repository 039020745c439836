//! Procedural macros for the jrpc JSON-RPC toolkit
//!
//! # Available Macros
//!
//! ## `#[procedure]` - Registrable JSON-RPC Method
//!
//! Keeps the annotated function as it is and adds a factory
//! `<name>_procedure()` returning a `jrpc_server::Procedure`. The procedure
//! carries:
//!
//! - the method name: the function name, or `name = "..."`
//! - the help text: the function's doc comment
//! - the visibility for `system.listMethods`: hidden with `hidden`
//!
//! Parameter and return conversions are the ones `Dispatcher::add_method`
//! uses, so the function may take any `FromValue` types and return any
//! `IntoValue` type or a `Result` of one.
//!
//! # Examples
//!
//! ```ignore
//! use jrpc_macros::procedure;
//! use jrpc_server::Server;
//!
//! /// Concatenate two strings
//! #[procedure]
//! fn concat(a: String, b: String) -> String {
//!     a + &b
//! }
//!
//! #[procedure(name = "debug.dump", hidden)]
//! fn dump() -> String {
//!     String::new()
//! }
//!
//! let server = Server::builder()
//!     .procedure(concat_procedure())
//!     .procedure(dump_procedure())
//!     .build()?;
//! ```

mod procedure;

use proc_macro::TokenStream;
use syn::parse_macro_input;

/// Turn a documented function into a registrable JSON-RPC procedure
///
/// Supported options: `name = "..."` and `hidden`. Methods, async functions
/// and generic functions are rejected at compile time.
#[proc_macro_attribute]
pub fn procedure(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = procedure::ProcedureArgs::default();
    let parser = syn::meta::parser(|meta| args.parse(meta));
    parse_macro_input!(attr with parser);

    let item = parse_macro_input!(item as syn::ItemFn);

    procedure::expand(args, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
