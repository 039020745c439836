//! `#[procedure]` attribute implementation
//!
//! # Code Generation Example
//!
//! Input:
//! ```ignore
//! /// Add two integers
//! #[procedure(name = "math.add")]
//! fn add(a: i32, b: i32) -> i32 {
//!     a + b
//! }
//! ```
//!
//! Generated output:
//! ```ignore
//! /// Add two integers
//! fn add(a: i32, b: i32) -> i32 {
//!     a + b
//! }
//!
//! fn add_procedure() -> ::jrpc_server::Procedure {
//!     ::jrpc_server::Procedure::new("math.add", add)
//!         .with_help("Add two integers")
//!         .hidden(false)
//! }
//! ```

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Expr, ExprLit, FnArg, ItemFn, Lit, LitStr, Meta};

/// Options accepted inside `#[procedure(...)]`
#[derive(Default)]
pub struct ProcedureArgs {
    name: Option<LitStr>,
    hidden: bool,
}

impl ProcedureArgs {
    pub fn parse(&mut self, meta: syn::meta::ParseNestedMeta) -> syn::Result<()> {
        if meta.path.is_ident("name") {
            self.name = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("hidden") {
            self.hidden = true;
            Ok(())
        } else {
            Err(meta.error("unsupported procedure option, expected `name` or `hidden`"))
        }
    }
}

/// Join the `///` lines of a function into its help text
fn help_text(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(doc) => match &doc.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(line), ..
                }) => Some(line.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

pub fn expand(args: ProcedureArgs, item: ItemFn) -> syn::Result<TokenStream> {
    let sig = &item.sig;

    if let Some(receiver) = sig.inputs.iter().find(|arg| matches!(arg, FnArg::Receiver(_))) {
        return Err(syn::Error::new_spanned(
            receiver,
            "#[procedure] cannot be used on methods; register bound methods with `add_bound_method`",
        ));
    }
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "#[procedure] functions must be synchronous",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "#[procedure] functions cannot be generic",
        ));
    }

    let fn_name = &sig.ident;
    let vis = &item.vis;
    let factory = format_ident!("{}_procedure", fn_name);
    let name = args
        .name
        .unwrap_or_else(|| LitStr::new(&fn_name.to_string(), fn_name.span()));
    let help = help_text(&item.attrs);
    let hidden = args.hidden;
    let factory_doc = format!("Registrable procedure for [`{}`]", fn_name);

    Ok(quote! {
        #item

        #[doc = #factory_doc]
        #vis fn #factory() -> ::jrpc_server::Procedure {
            ::jrpc_server::Procedure::new(#name, #fn_name)
                .with_help(#help)
                .hidden(#hidden)
        }
    })
}
