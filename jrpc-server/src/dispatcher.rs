//! Method registry and invocation
//!
//! The dispatcher maps method names to type-erased [`Method`]s and turns a
//! call into a [`Response`]. It is the failure boundary of the engine: nothing
//! a procedure does, short of aborting the process, escapes `invoke`.
//!
//! # Core Responsibilities
//!
//! - **Registration**: native functions, bound functions and raw methods,
//!   each with help text, visibility and signatures for introspection
//! - **Aliasing**: forwarding one name to another with leading arguments bound
//! - **Invocation**: lookup, adapter call and fault mapping
//!
//! # Failure Mapping
//!
//! | raised by the method                    | fault                           |
//! |-----------------------------------------|---------------------------------|
//! | `Error::Fault`                          | the fault itself                |
//! | `Error::InvalidArgument` / `OutOfRange` | `-32602 Invalid parameters`     |
//! | any other `Error`                       | `-32000` with its description   |
//! | panic with a string payload             | `-32000` with the panic message |
//! | panic with any other payload            | `0 unknown error`               |
//!
//! # Thread Safety
//!
//! Registration takes `&mut self` and invocation takes `&self`, so the borrow
//! checker enforces that registration completes before shared invocation
//! begins. A dispatcher that must change while shared needs an external lock.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::{params, Id, Value};
//! use jrpc_server::Dispatcher;
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher
//!     .add_method("add", |a: i32, b: i32| a + b)
//!     .unwrap()
//!     .set_help_text("Add two integers");
//! dispatcher.add_alias("add", "add3", params![3]);
//!
//! let response = dispatcher.invoke("add3", params![2], Id::from(1i64));
//! assert_eq!(response.result(), Some(&Value::Integer32(5)));
//! ```

use crate::handler::{from_raw_fn, IntoBoundMethod, IntoMethod, Method, Procedure};
use crate::introspection;
use jrpc_core::{Error, Fault, Id, Response, Result, Value, ValueKind};
use std::any::Any;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// A registered method and its metadata
///
/// Signatures are `[return kind, parameter kinds..]` and serve introspection
/// only. The adapter performs its own arity and kind checks at call time.
pub struct MethodWrapper {
    name: String,
    method: Box<dyn Method>,
    hidden: bool,
    help_text: String,
    signatures: Vec<Vec<ValueKind>>,
}

impl MethodWrapper {
    fn new(name: String, method: Box<dyn Method>, signature: Option<Vec<ValueKind>>) -> Self {
        Self {
            name,
            method,
            hidden: false,
            help_text: String::new(),
            signatures: signature.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Hidden methods are left out of `system.listMethods`
    pub fn set_hidden(&mut self, hidden: bool) -> &mut Self {
        self.hidden = hidden;
        self
    }

    pub fn help_text(&self) -> &str {
        &self.help_text
    }

    pub fn set_help_text(&mut self, help_text: impl Into<String>) -> &mut Self {
        self.help_text = help_text.into();
        self
    }

    pub fn signatures(&self) -> &[Vec<ValueKind>] {
        &self.signatures
    }

    pub fn add_signature(&mut self, signature: Vec<ValueKind>) -> &mut Self {
        self.signatures.push(signature);
        self
    }

    /// Call the adapter without the failure boundary of `Dispatcher::invoke`
    pub fn call(&self, params: Vec<Value>) -> Result<Value> {
        self.method.call(params)
    }
}

impl fmt::Debug for MethodWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodWrapper")
            .field("name", &self.name)
            .field("hidden", &self.hidden)
            .field("help_text", &self.help_text)
            .field("signatures", &self.signatures)
            .finish_non_exhaustive()
    }
}

/// Forwarding entry: a target method name and leading bound arguments
///
/// The target is looked up when the alias is invoked, so it does not need to
/// exist when the alias is added.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasWrapper {
    pub target: String,
    pub bound: Vec<Value>,
}

/// Registry of JSON-RPC methods
#[derive(Default)]
pub struct Dispatcher {
    methods: BTreeMap<String, MethodWrapper>,
    aliases: HashMap<String, AliasWrapper>,
    introspection: bool,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(
        &mut self,
        name: String,
        method: Box<dyn Method>,
        signature: Option<Vec<ValueKind>>,
    ) -> Result<&mut MethodWrapper> {
        match self.methods.entry(name) {
            Entry::Occupied(entry) => {
                warn!(method = %entry.key(), "method already added");
                Err(Error::InvalidArgument(format!(
                    "{}: method already added",
                    entry.key()
                )))
            }
            Entry::Vacant(entry) => {
                let name = entry.key().clone();
                debug!(method = %name, "method added");
                Ok(entry.insert(MethodWrapper::new(name, method, signature)))
            }
        }
    }

    /// Register a native function
    ///
    /// The parameter and return kinds become the method's first signature
    /// when all of them are known.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if `name` is already registered. The
    /// registry is left unchanged.
    pub fn add_method<F, Args>(
        &mut self,
        name: impl Into<String>,
        func: F,
    ) -> Result<&mut MethodWrapper>
    where
        F: IntoMethod<Args>,
    {
        self.insert(name.into(), func.into_method(), F::signature())
    }

    /// Register a method over the raw parameter list
    pub fn add_raw_method<F>(
        &mut self,
        name: impl Into<String>,
        func: F,
    ) -> Result<&mut MethodWrapper>
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        self.insert(name.into(), from_raw_fn(func), None)
    }

    /// Register a function that receives `instance` as its first argument
    ///
    /// The instance is shared, not copied: it stays alive as long as the
    /// method is registered, and state changed through interior mutability is
    /// visible to the caller that kept its own `Arc`.
    pub fn add_bound_method<T, F, Args>(
        &mut self,
        name: impl Into<String>,
        instance: Arc<T>,
        func: F,
    ) -> Result<&mut MethodWrapper>
    where
        F: IntoBoundMethod<T, Args>,
    {
        self.insert(name.into(), func.into_bound_method(instance), F::signature())
    }

    /// Register a prepared [`Procedure`] with its metadata
    pub fn register(&mut self, procedure: Procedure) -> Result<&mut MethodWrapper> {
        let Procedure {
            name,
            help_text,
            hidden,
            signature,
            method,
        } = procedure;

        let wrapper = self.insert(name, method, signature)?;
        wrapper.set_help_text(help_text).set_hidden(hidden);
        Ok(wrapper)
    }

    /// # Errors
    ///
    /// `Error::OutOfRange` if no method is registered under `name`.
    pub fn get_method(&self, name: &str) -> Result<&MethodWrapper> {
        self.methods
            .get(name)
            .ok_or_else(|| Error::OutOfRange(format!("{}: no such method", name)))
    }

    pub fn get_method_mut(&mut self, name: &str) -> Result<&mut MethodWrapper> {
        self.methods
            .get_mut(name)
            .ok_or_else(|| Error::OutOfRange(format!("{}: no such method", name)))
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Unregister a method, returning it if it existed
    ///
    /// Aliases that target the method are kept and fail with
    /// `Method not found` until the name is registered again.
    pub fn remove_method(&mut self, name: &str) -> Option<MethodWrapper> {
        let removed = self.methods.remove(name);
        if removed.is_some() {
            debug!(method = name, "method removed");
        }
        removed
    }

    /// Registered method names in ascending order
    ///
    /// Introspection methods count as hidden.
    pub fn method_names(&self, include_hidden: bool) -> Vec<String> {
        let mut names: Vec<String> = self
            .methods
            .values()
            .filter(|wrapper| include_hidden || !wrapper.hidden)
            .map(|wrapper| wrapper.name.clone())
            .collect();

        if include_hidden && self.introspection {
            names.extend(
                introspection::BUILTINS
                    .iter()
                    .filter(|name| !self.methods.contains_key(**name))
                    .map(|name| name.to_string()),
            );
            names.sort();
        }
        names
    }

    /// Forward `alias` to `target` with `bound` prepended to the parameters
    ///
    /// Replaces an existing alias of the same name and returns it.
    pub fn add_alias(
        &mut self,
        target: impl Into<String>,
        alias: impl Into<String>,
        bound: Vec<Value>,
    ) -> Option<AliasWrapper> {
        let target = target.into();
        let alias = alias.into();
        debug!(alias = %alias, target = %target, bound = bound.len(), "alias added");
        self.aliases.insert(alias, AliasWrapper { target, bound })
    }

    pub fn get_alias(&self, alias: &str) -> Option<&AliasWrapper> {
        self.aliases.get(alias)
    }

    pub fn remove_alias(&mut self, alias: &str) -> Option<AliasWrapper> {
        self.aliases.remove(alias)
    }

    /// Answer `system.listMethods`, `system.methodHelp` and
    /// `system.methodSignature`
    pub fn enable_introspection(&mut self) -> &mut Self {
        self.introspection = true;
        self
    }

    pub fn introspection_enabled(&self) -> bool {
        self.introspection
    }

    /// Invoke a method and build the response
    ///
    /// 1. An alias is replaced by its target, its bound arguments spliced in
    ///    front of `params`. Aliases are resolved once and never chain.
    /// 2. A name that is not registered yields `Method not found: <name>`.
    /// 3. The method runs inside the failure boundary described in the
    ///    module documentation.
    #[tracing::instrument(level = "debug", skip(self, params, id), fields(id = %id))]
    pub fn invoke(&self, name: &str, params: Vec<Value>, id: Id) -> Response {
        let (target, params) = match self.aliases.get(name) {
            Some(alias) => {
                debug!(method = %alias.target, "resolved alias");
                let mut spliced = alias.bound.clone();
                spliced.extend(params);
                (alias.target.as_str(), spliced)
            }
            None => (name, params),
        };

        let outcome = if let Some(wrapper) = self.methods.get(target) {
            guarded(target, || wrapper.call(params))
        } else if self.introspection && introspection::is_builtin(target) {
            guarded(target, || introspection::call(self, target, params))
        } else {
            debug!(method = target, "method not found");
            Err(Fault::method_not_found(target))
        };

        match outcome {
            Ok(result) => Response::success(result, id),
            Err(fault) => Response::fault(fault, id),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .field("introspection", &self.introspection)
            .finish()
    }
}

/// Run a method call, converting errors and panics into faults
fn guarded<F>(method: &str, call: F) -> std::result::Result<Value, Fault>
where
    F: FnOnce() -> Result<Value>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(err)) => {
            debug!(method, error = %err, "method failed");
            Err(err.into_fault())
        }
        Err(payload) => Err(fault_from_panic(method, payload)),
    }
}

fn fault_from_panic(method: &str, payload: Box<dyn Any + Send>) -> Fault {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned());

    match message {
        Some(message) => {
            error!(method, panic = %message, "method panicked");
            Fault::server_error(Fault::SERVER_ERROR_CODE_DEFAULT, message)
        }
        None => {
            error!(method, "method panicked with a non-string payload");
            Fault::unknown()
        }
    }
}
