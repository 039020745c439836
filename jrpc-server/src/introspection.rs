//! Built-in introspection methods
//!
//! When enabled on a [`Dispatcher`], these names are answered from the
//! registry itself:
//!
//! - `system.listMethods()`: names of all non-hidden methods, sorted
//! - `system.methodHelp(name)`: the help text of a method
//! - `system.methodSignature(name)`: the signatures of a method, each an
//!   array of kind names with the return kind first
//!
//! The builtins count as hidden methods. A method registered under the same
//! name takes precedence.

use crate::dispatcher::Dispatcher;
use jrpc_core::{Error, Fault, FromValue, IntoValue, Result, Value};

pub const LIST_METHODS: &str = "system.listMethods";
pub const METHOD_HELP: &str = "system.methodHelp";
pub const METHOD_SIGNATURE: &str = "system.methodSignature";

pub(crate) const BUILTINS: &[&str] = &[LIST_METHODS, METHOD_HELP, METHOD_SIGNATURE];

pub(crate) fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

fn method_name(params: Vec<Value>) -> Result<String> {
    let [name]: [Value; 1] = params
        .try_into()
        .map_err(|_| Error::Fault(Fault::invalid_parameters()))?;
    String::from_value(name)
}

pub(crate) fn call(dispatcher: &Dispatcher, name: &str, params: Vec<Value>) -> Result<Value> {
    match name {
        LIST_METHODS => {
            if !params.is_empty() {
                return Err(Error::Fault(Fault::invalid_parameters()));
            }
            Ok(dispatcher.method_names(false).into_value())
        }
        METHOD_HELP => {
            let target = method_name(params)?;
            Ok(Value::from(dispatcher.get_method(&target)?.help_text()))
        }
        METHOD_SIGNATURE => {
            let target = method_name(params)?;
            let signatures = dispatcher
                .get_method(&target)?
                .signatures()
                .iter()
                .map(|signature| signature.iter().map(|kind| kind.as_str()).collect::<Vec<_>>())
                .collect::<Vec<_>>();
            Ok(signatures.into_value())
        }
        other => Err(Error::Fault(Fault::method_not_found(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jrpc_core::{params, Id};

    fn dispatcher() -> Dispatcher {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .add_method("subtract", |a: i64, b: i64| a - b)
            .unwrap()
            .set_help_text("Subtract b from a");
        dispatcher
            .add_method("echo", |v: Value| v)
            .unwrap()
            .set_hidden(true);
        dispatcher.add_method("add", |a: i32, b: i32| a + b).unwrap();
        dispatcher.enable_introspection();
        dispatcher
    }

    fn result_of(dispatcher: &Dispatcher, name: &str, params: Vec<Value>) -> Value {
        dispatcher
            .invoke(name, params, Id::from(1i64))
            .into_result()
            .unwrap()
    }

    #[test]
    fn test_list_methods() {
        let names = result_of(&dispatcher(), LIST_METHODS, params![]);
        assert_eq!(names, vec!["add", "subtract"].into_value());
    }

    #[test]
    fn test_method_help() {
        let help = result_of(&dispatcher(), METHOD_HELP, params!["subtract"]);
        assert_eq!(help, Value::from("Subtract b from a"));
    }

    #[test]
    fn test_method_signature() {
        let signature = result_of(&dispatcher(), METHOD_SIGNATURE, params!["subtract"]);
        assert_eq!(signature, vec![vec!["i8", "i8", "i8"]].into_value());

        let untyped = result_of(&dispatcher(), METHOD_SIGNATURE, params!["echo"]);
        assert_eq!(untyped, Value::Array(vec![]));
    }

    #[test]
    fn test_unknown_method_is_invalid_parameters() {
        let response = dispatcher().invoke(METHOD_HELP, params!["nope"], Id::from(1i64));
        assert_eq!(response.error().unwrap().code, Fault::INVALID_PARAMETERS);

        let response = dispatcher().invoke(LIST_METHODS, params![1], Id::from(1i64));
        assert_eq!(response.error().unwrap().code, Fault::INVALID_PARAMETERS);
    }

    #[test]
    fn test_disabled_by_default() {
        let dispatcher = Dispatcher::new();
        let response = dispatcher.invoke(LIST_METHODS, params![], Id::from(1i64));
        assert_eq!(response.error().unwrap().code, Fault::METHOD_NOT_FOUND);
        assert!(dispatcher.method_names(true).is_empty());
    }

    #[test]
    fn test_builtins_listed_as_hidden() {
        let names = dispatcher().method_names(true);
        assert_eq!(
            names,
            vec![
                "add",
                "echo",
                "subtract",
                "system.listMethods",
                "system.methodHelp",
                "system.methodSignature"
            ]
        );
    }
}
