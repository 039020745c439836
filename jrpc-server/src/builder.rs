//! Server builder for fluent configuration
//!
//! Registration errors do not interrupt the chain. The builder remembers the
//! first one and reports it from [`ServerBuilder::build`].
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::params;
//! use jrpc_server::ServerBuilder;
//!
//! let server = ServerBuilder::new()
//!     .method("add", |a: i32, b: i32| a + b)
//!     .alias("add", "increment", params![1])
//!     .with_introspection()
//!     .build()
//!     .unwrap();
//!
//! assert!(server.dispatcher().has_method("add"));
//! assert!(server.dispatcher().introspection_enabled());
//! ```

use crate::dispatcher::Dispatcher;
use crate::handler::{IntoBoundMethod, IntoMethod, Procedure};
use crate::Server;
use jrpc_core::{Error, Result, Value};
use std::sync::Arc;

/// Builder for [`Server`]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    dispatcher: Dispatcher,
    error: Option<Error>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn record<T>(&mut self, outcome: Result<T>) {
        if let Err(err) = outcome {
            self.error.get_or_insert(err);
        }
    }

    /// Register a native function
    pub fn method<F, Args>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: IntoMethod<Args>,
    {
        let outcome = self.dispatcher.add_method(name, func).map(|_| ());
        self.record(outcome);
        self
    }

    /// Register a method over the raw parameter list
    pub fn raw_method<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        let outcome = self.dispatcher.add_raw_method(name, func).map(|_| ());
        self.record(outcome);
        self
    }

    /// Register a function bound to a shared instance
    pub fn bound_method<T, F, Args>(
        mut self,
        name: impl Into<String>,
        instance: Arc<T>,
        func: F,
    ) -> Self
    where
        F: IntoBoundMethod<T, Args>,
    {
        let outcome = self
            .dispatcher
            .add_bound_method(name, instance, func)
            .map(|_| ());
        self.record(outcome);
        self
    }

    /// Register a prepared procedure, typically from `#[procedure]`
    pub fn procedure(mut self, procedure: Procedure) -> Self {
        let outcome = self.dispatcher.register(procedure).map(|_| ());
        self.record(outcome);
        self
    }

    pub fn alias(
        mut self,
        target: impl Into<String>,
        alias: impl Into<String>,
        bound: Vec<Value>,
    ) -> Self {
        self.dispatcher.add_alias(target, alias, bound);
        self
    }

    pub fn with_introspection(mut self) -> Self {
        self.dispatcher.enable_introspection();
        self
    }

    /// # Errors
    ///
    /// The first registration error, e.g. a duplicate method name.
    pub fn build(self) -> Result<Server> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(Server::with_dispatcher(self.dispatcher)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build() {
        let server = ServerBuilder::new()
            .method("ping", || "pong")
            .raw_method("count", |params| Ok(Value::from(params.len() as i32)))
            .build()
            .unwrap();

        assert_eq!(server.dispatcher().method_names(false), vec!["count", "ping"]);
    }

    #[test]
    fn test_first_error_reported() {
        let err = ServerBuilder::new()
            .method("ping", || "pong")
            .method("ping", || "again")
            .procedure(Procedure::new("ping", || 1))
            .build()
            .unwrap_err();

        assert_eq!(err, Error::InvalidArgument("ping: method already added".into()));
    }

    #[test]
    fn test_bound_method() {
        struct Greeter {
            greeting: String,
        }

        let greeter = Arc::new(Greeter {
            greeting: "hello".into(),
        });
        let server = ServerBuilder::new()
            .bound_method("greet", greeter, |g: &Greeter, name: String| {
                format!("{} {}", g.greeting, name)
            })
            .build()
            .unwrap();

        assert!(server.dispatcher().has_method("greet"));
    }
}
