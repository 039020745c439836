//! Adapters that turn native functions into JSON-RPC methods
//!
//! The dispatcher stores every method behind the object-safe [`Method`] trait,
//! which takes the positional parameters as `Vec<Value>` and returns a `Value`.
//! Native functions are adapted into that shape at registration time.
//!
//! # Adapting Native Functions
//!
//! Any `Fn(A1, .., An) -> R` with up to eight parameters is a method when every
//! `Ai` implements [`FromValue`] and `R` implements [`IntoOutcome`]
//! (a plain value, `()`, or a `Result` whose error converts into `Error`).
//! The generated adapter:
//!
//! 1. fails with `Invalid parameters` unless exactly `n` parameters were passed
//! 2. converts each parameter with its tag-checked `FromValue` conversion
//! 3. calls the function
//! 4. converts the return value back into a `Value` (`()` becomes `Nil`)
//!
//! Functions that take a shared instance as their first argument are adapted
//! the same way through [`IntoBoundMethod`].
//!
//! # Examples
//!
//! ```rust
//! use jrpc_server::{IntoMethod, Method};
//! use jrpc_core::{params, Value};
//!
//! let add = (|a: i32, b: i32| a + b).into_method();
//! assert_eq!(add.call(params![3, 2]).unwrap(), Value::Integer32(5));
//! assert!(add.call(params![3]).is_err());
//! ```

use jrpc_core::{Error, Fault, FromValue, IntoOutcome, Result, Value, ValueKind};
use std::marker::PhantomData;
use std::sync::Arc;

/// A type-erased JSON-RPC method
///
/// Methods must be `Send + Sync` so a fully registered dispatcher can be
/// shared between threads.
pub trait Method: Send + Sync {
    fn call(&self, params: Vec<Value>) -> Result<Value>;
}

/// Pre-erased method working directly on the parameter list
struct RawMethod<F>(F);

impl<F> Method for RawMethod<F>
where
    F: Fn(Vec<Value>) -> Result<Value> + Send + Sync,
{
    fn call(&self, params: Vec<Value>) -> Result<Value> {
        (self.0)(params)
    }
}

/// Wrap a function over the raw parameter list
pub fn from_raw_fn<F>(func: F) -> Box<dyn Method>
where
    F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
{
    Box::new(RawMethod(func))
}

/// Native function with an arbitrary signature
///
/// `Args` is only a marker that selects the arity; it is the tuple of
/// parameter types.
pub trait IntoMethod<Args>: Send + Sync + 'static {
    fn into_method(self) -> Box<dyn Method>;

    /// `[return kind, parameter kinds..]`, when every kind is known
    fn signature() -> Option<Vec<ValueKind>>;
}

/// Native function whose first argument is a shared instance
pub trait IntoBoundMethod<T, Args>: Send + Sync + 'static {
    fn into_bound_method(self, instance: Arc<T>) -> Box<dyn Method>;

    fn signature() -> Option<Vec<ValueKind>>;
}

struct FnMethod<F, Sig> {
    func: F,
    _signature: PhantomData<Sig>,
}

struct BoundMethod<T, F, Sig> {
    instance: Arc<T>,
    func: F,
    _signature: PhantomData<Sig>,
}

fn arity_mismatch(_params: Vec<Value>) -> Error {
    Error::Fault(Fault::invalid_parameters())
}

macro_rules! impl_into_method {
    ($count:literal; $($ty:ident $arg:ident),*) => {
        impl<F, R, $($ty,)*> Method for FnMethod<F, fn($($ty),*) -> R>
        where
            F: Fn($($ty),*) -> R + Send + Sync,
            R: IntoOutcome,
            $($ty: FromValue,)*
        {
            fn call(&self, params: Vec<Value>) -> Result<Value> {
                let [$($arg,)*]: [Value; $count] = params.try_into().map_err(arity_mismatch)?;
                (self.func)($($ty::from_value($arg)?),*).into_outcome()
            }
        }

        impl<F, R, $($ty,)*> IntoMethod<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: IntoOutcome + 'static,
            $($ty: FromValue + 'static,)*
        {
            fn into_method(self) -> Box<dyn Method> {
                Box::new(FnMethod {
                    func: self,
                    _signature: PhantomData::<fn($($ty),*) -> R>,
                })
            }

            fn signature() -> Option<Vec<ValueKind>> {
                Some(vec![R::KIND? $(, $ty::KIND?)*])
            }
        }

        impl<T, F, R, $($ty,)*> Method for BoundMethod<T, F, fn($($ty),*) -> R>
        where
            T: Send + Sync,
            F: Fn(&T $(, $ty)*) -> R + Send + Sync,
            R: IntoOutcome,
            $($ty: FromValue,)*
        {
            fn call(&self, params: Vec<Value>) -> Result<Value> {
                let [$($arg,)*]: [Value; $count] = params.try_into().map_err(arity_mismatch)?;
                (self.func)(&self.instance $(, $ty::from_value($arg)?)*).into_outcome()
            }
        }

        impl<T, F, R, $($ty,)*> IntoBoundMethod<T, ($($ty,)*)> for F
        where
            T: Send + Sync + 'static,
            F: Fn(&T $(, $ty)*) -> R + Send + Sync + 'static,
            R: IntoOutcome + 'static,
            $($ty: FromValue + 'static,)*
        {
            fn into_bound_method(self, instance: Arc<T>) -> Box<dyn Method> {
                Box::new(BoundMethod {
                    instance,
                    func: self,
                    _signature: PhantomData::<fn($($ty),*) -> R>,
                })
            }

            fn signature() -> Option<Vec<ValueKind>> {
                Some(vec![R::KIND? $(, $ty::KIND?)*])
            }
        }
    };
}

impl_into_method!(0;);
impl_into_method!(1; A1 a1);
impl_into_method!(2; A1 a1, A2 a2);
impl_into_method!(3; A1 a1, A2 a2, A3 a3);
impl_into_method!(4; A1 a1, A2 a2, A3 a3, A4 a4);
impl_into_method!(5; A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_into_method!(6; A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_into_method!(7; A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_into_method!(8; A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);

/// A method together with its registration metadata
///
/// Built by hand or by the `#[procedure]` attribute, then handed to
/// `Dispatcher::register`.
///
/// # Examples
///
/// ```rust
/// use jrpc_server::{Dispatcher, Procedure};
///
/// let procedure = Procedure::new("concat", |a: String, b: String| a + &b)
///     .with_help("Concatenate two strings");
///
/// let mut dispatcher = Dispatcher::new();
/// dispatcher.register(procedure).unwrap();
/// assert_eq!(dispatcher.get_method("concat").unwrap().help_text(), "Concatenate two strings");
/// ```
pub struct Procedure {
    pub(crate) name: String,
    pub(crate) help_text: String,
    pub(crate) hidden: bool,
    pub(crate) signature: Option<Vec<ValueKind>>,
    pub(crate) method: Box<dyn Method>,
}

impl Procedure {
    pub fn new<F, Args>(name: impl Into<String>, func: F) -> Self
    where
        F: IntoMethod<Args>,
    {
        Self {
            name: name.into(),
            help_text: String::new(),
            hidden: false,
            signature: F::signature(),
            method: func.into_method(),
        }
    }

    /// A procedure over the raw parameter list; it has no signature
    pub fn raw<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            help_text: String::new(),
            hidden: false,
            signature: None,
            method: from_raw_fn(func),
        }
    }

    pub fn with_help(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = help_text.into();
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for Procedure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Procedure")
            .field("name", &self.name)
            .field("hidden", &self.hidden)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}
