//! Native function dispatch bridge.
//!
//! `register_fn` accepts any `Fn(A1, .., An) -> R` with `n <= 6`, where every
//! `Ai: FromValue` and `R: NativeReturn`. The parameter kinds are captured
//! once at registration; each call checks the argument count, converts every
//! argument with an exact kind match, and returns a typed `DispatchError`
//! instead of panicking.

use std::fmt;

use dsl_ir::Name;
use dsl_value::{FromValue, IntoValue, ParamKind, Value};

use crate::DispatchError;

type Invoke = Box<dyn Fn(&[Value]) -> Result<Value, DispatchError> + Send + Sync>;

/// A registered host function.
pub struct NativeFunction {
    signature: Signature,
    invoke: Invoke,
}

impl NativeFunction {
    /// Build a fixed-arity function from a typed closure.
    pub fn typed<Args, F>(name: Name, f: F, yielding: bool) -> Self
    where
        F: NativeFn<Args>,
    {
        let signature = Signature {
            name: name.clone(),
            params: Some(<F as NativeFn<Args>>::params()),
            yielding,
        };
        NativeFunction {
            signature,
            invoke: Box::new(move |args: &[Value]| f.call(&name, args)),
        }
    }

    /// Build a function accepting any number of arguments.
    pub fn variadic<F>(name: Name, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, DispatchError> + Send + Sync + 'static,
    {
        NativeFunction {
            signature: Signature {
                name,
                params: None,
                yielding: false,
            },
            invoke: Box::new(f),
        }
    }

    pub fn name(&self) -> &Name {
        &self.signature.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Whether a call to this function is a suspension point.
    pub fn is_yielding(&self) -> bool {
        self.signature.yielding
    }

    /// Invoke with dynamically-typed arguments.
    pub fn call(&self, args: &[Value]) -> Result<Value, DispatchError> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Declared shape of a host function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub name: Name,
    /// Parameter kinds in order; `None` for variadic functions.
    pub params: Option<Vec<ParamKind>>,
    pub yielding: bool,
}

impl Signature {
    pub fn arity(&self) -> Option<usize> {
        self.params.as_ref().map(Vec::len)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        match &self.params {
            Some(params) => {
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
            }
            None => f.write_str("...")?,
        }
        f.write_str(")")
    }
}

/// Conversion of a host function's return value.
///
/// Implemented for every `IntoValue` type and for `Result<T, E>` where an
/// `Err` becomes `DispatchError::HostFailure`.
pub trait NativeReturn {
    fn into_native(self, function: &Name) -> Result<Value, DispatchError>;
}

macro_rules! impl_native_return {
    ($($ty:ty),*) => {
        $(
            impl NativeReturn for $ty {
                fn into_native(self, _function: &Name) -> Result<Value, DispatchError> {
                    Ok(self.into_value())
                }
            }
        )*
    };
}

impl_native_return!(Value, bool, i64, i32, f64, String, &str, ());

impl<T, E> NativeReturn for Result<T, E>
where
    T: IntoValue,
    E: fmt::Display,
{
    fn into_native(self, function: &Name) -> Result<Value, DispatchError> {
        self.map(IntoValue::into_value)
            .map_err(|err| DispatchError::host_failure(function, err))
    }
}

/// A host closure callable with dynamically-typed arguments.
///
/// `Args` is the tuple of parameter types; it only disambiguates the
/// per-arity implementations and never needs to be named.
pub trait NativeFn<Args>: Send + Sync + 'static {
    /// Parameter kinds in declaration order.
    fn params() -> Vec<ParamKind>;

    fn call(&self, name: &Name, args: &[Value]) -> Result<Value, DispatchError>;
}

#[inline]
fn convert<T: FromValue>(function: &Name, index: usize, value: &Value) -> Result<T, DispatchError> {
    T::from_value(value).map_err(|source| DispatchError::ArgumentTypeMismatch {
        function: function.clone(),
        position: index + 1,
        source,
    })
}

#[cold]
fn arity_mismatch(function: &Name, expected: usize, found: usize) -> DispatchError {
    DispatchError::ArityMismatch {
        function: function.clone(),
        expected,
        found,
    }
}

macro_rules! impl_native_fn {
    ($($ty:ident $arg:ident $idx:tt),*) => {
        impl<Func, Ret, $($ty,)*> NativeFn<($($ty,)*)> for Func
        where
            Func: Fn($($ty),*) -> Ret + Send + Sync + 'static,
            Ret: NativeReturn,
            $($ty: FromValue,)*
        {
            fn params() -> Vec<ParamKind> {
                vec![$(<$ty as FromValue>::PARAM),*]
            }

            fn call(&self, name: &Name, args: &[Value]) -> Result<Value, DispatchError> {
                let [$($arg),*] = args else {
                    let expected = <Self as NativeFn<($($ty,)*)>>::params().len();
                    return Err(arity_mismatch(name, expected, args.len()));
                };
                $(let $arg: $ty = convert(name, $idx, $arg)?;)*
                (self)($($arg),*).into_native(name)
            }
        }
    };
}

impl_native_fn!();
impl_native_fn!(A1 a1 0);
impl_native_fn!(A1 a1 0, A2 a2 1);
impl_native_fn!(A1 a1 0, A2 a2 1, A3 a3 2);
impl_native_fn!(A1 a1 0, A2 a2 1, A3 a3 2, A4 a4 3);
impl_native_fn!(A1 a1 0, A2 a2 1, A3 a3 2, A4 a4 3, A5 a5 4);
impl_native_fn!(A1 a1 0, A2 a2 1, A3 a3 2, A4 a4 3, A5 a5 4, A6 a6 5);
