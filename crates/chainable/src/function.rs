//! Function: type-erased callable plus its introspectable signature
//!
//! Closures are erased at chain build time. The [`Signature`] recorded with
//! each [`Function`] is what the invocation engine queries to validate
//! arity, substitute nil arguments and classify the trailing return slot.
use crate::arg::Arg;
use crate::error::Fault;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Types a link may declare as a parameter.
///
/// `Default` supplies the zero value substituted for a nil argument.
pub trait Param: Any + Clone + Default + Send + Sync {}

impl<T> Param for T where T: Any + Clone + Default + Send + Sync {}

/// Arity shape of a callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    /// A fixed prefix followed by any number of trailing arguments.
    Variadic { prefix: usize },
}

impl Arity {
    /// Fixed positional parameter count.
    pub fn fixed(&self) -> usize {
        match *self {
            Self::Fixed(n) | Self::Variadic { prefix: n } => n,
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self, Self::Variadic { .. })
    }

    pub fn accepts(&self, n_args: usize) -> bool {
        match *self {
            Self::Fixed(n) => n_args == n,
            Self::Variadic { prefix } => n_args >= prefix,
        }
    }
}

#[derive(Clone)]
pub struct ParamSpec {
    type_id: TypeId,
    type_name: &'static str,
    zero: fn() -> Arg,
}

impl ParamSpec {
    pub fn of<T: Param>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            zero: || Arg::shared(Arc::new(T::default())),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The zero value of this parameter type.
    pub fn zero(&self) -> Arg {
        (self.zero)()
    }
}

impl fmt::Debug for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// A declared return slot.
#[derive(Debug, Clone)]
pub struct SlotSpec {
    type_name: &'static str,
    is_error: bool,
}

impl SlotSpec {
    pub fn of<T: Any>() -> Self {
        let id = TypeId::of::<T>();
        Self {
            type_name: type_name::<T>(),
            is_error: id == TypeId::of::<Option<Fault>>() || id == TypeId::of::<Fault>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the slot's static type is the error kind.
    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// Shape of a callable as known at chain build time.
#[derive(Debug, Clone)]
pub struct Signature {
    params: Vec<ParamSpec>,
    variadic: Option<ParamSpec>,
    returns: Vec<SlotSpec>,
}

impl Signature {
    pub fn arity(&self) -> Arity {
        match self.variadic {
            Some(_) => Arity::Variadic {
                prefix: self.params.len(),
            },
            None => Arity::Fixed(self.params.len()),
        }
    }

    /// Declared parameter type at `position`, trailing variadic positions included.
    pub fn param(&self, position: usize) -> Option<&ParamSpec> {
        self.params.get(position).or(self.variadic.as_ref())
    }

    pub fn returns(&self) -> &[SlotSpec] {
        &self.returns
    }

    /// Whether the last declared return slot is error-typed.
    pub fn returns_error(&self) -> bool {
        self.returns.last().is_some_and(SlotSpec::is_error)
    }
}

/// Raised by an erased call when an argument does not downcast to the
/// declared parameter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    pub position: usize,
    pub expected: &'static str,
    pub found: &'static str,
}

type ErasedCall = dyn Fn(Vec<Arg>) -> Result<Vec<Arg>, TypeMismatch> + Send + Sync;

/// An opaque callable usable as a link.
#[derive(Clone)]
pub struct Function {
    name: String,
    signature: Signature,
    call: Arc<ErasedCall>,
}

impl Function {
    /// Erases a closure returning a single value. A `()` return declares no
    /// return slot; an `Option<Fault>` return declares an error slot.
    ///
    /// ```
    /// use chainable::Function;
    ///
    /// let double = Function::new(|x: i32| x * 2);
    /// assert_eq!(double.signature().returns().len(), 1);
    /// ```
    pub fn new<F, Args, R>(f: F) -> Self
    where
        F: Callable<Args, R>,
        R: Any + Send + Sync,
    {
        Self::erase::<F, _>(F::params(), None, single_slot::<R>(), move |args| {
            f.call(args).map(single_output)
        })
    }

    /// Erases a closure returning a tuple, one return slot per element.
    pub fn multi<F, Args, R>(f: F) -> Self
    where
        F: Callable<Args, R>,
        R: Outputs,
    {
        Self::erase::<F, _>(F::params(), None, R::slots(), move |args| {
            f.call(args).map(Outputs::into_args)
        })
    }

    /// Erases a closure whose last parameter is a `Vec<T>` collecting every
    /// argument past the fixed prefix.
    pub fn variadic<F, Prefix, T, R>(f: F) -> Self
    where
        F: VariadicCallable<Prefix, T, R>,
        T: Param,
        R: Any + Send + Sync,
    {
        Self::erase::<F, _>(
            F::params(),
            Some(ParamSpec::of::<T>()),
            single_slot::<R>(),
            move |args| f.call(args).map(single_output),
        )
    }

    /// Variadic counterpart of [`Function::multi`].
    pub fn variadic_multi<F, Prefix, T, R>(f: F) -> Self
    where
        F: VariadicCallable<Prefix, T, R>,
        T: Param,
        R: Outputs,
    {
        Self::erase::<F, _>(
            F::params(),
            Some(ParamSpec::of::<T>()),
            R::slots(),
            move |args| f.call(args).map(Outputs::into_args),
        )
    }

    fn erase<F, C>(
        params: Vec<ParamSpec>,
        variadic: Option<ParamSpec>,
        returns: Vec<SlotSpec>,
        call: C,
    ) -> Self
    where
        C: Fn(Vec<Arg>) -> Result<Vec<Arg>, TypeMismatch> + Send + Sync + 'static,
    {
        Self {
            name: type_name::<F>().to_string(),
            signature: Signature {
                params,
                variadic,
                returns,
            },
            call: Arc::new(call),
        }
    }

    /// Labels the function in diagnostics and run reports.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Calls the erased closure. Arguments must already be non-nil and match
    /// the signature's arity.
    pub(crate) fn call(&self, args: Vec<Arg>) -> Result<Vec<Arg>, TypeMismatch> {
        (self.call)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

fn is_unit<R: Any>() -> bool {
    TypeId::of::<R>() == TypeId::of::<()>()
}

fn single_slot<R: Any>() -> Vec<SlotSpec> {
    if is_unit::<R>() {
        Vec::new()
    } else {
        vec![SlotSpec::of::<R>()]
    }
}

fn single_output<R: Any + Send + Sync>(value: R) -> Vec<Arg> {
    if is_unit::<R>() {
        Vec::new()
    } else {
        vec![Arg::new(value)]
    }
}

/// Return shapes spread over several slots.
pub trait Outputs: Any + Send + Sync {
    fn slots() -> Vec<SlotSpec>;
    fn into_args(self) -> Vec<Arg>;
}

/// Closures of a fixed arity, keyed by their parameter tuple.
pub trait Callable<Args, R>: Send + Sync + 'static {
    fn params() -> Vec<ParamSpec>;
    fn call(&self, args: Vec<Arg>) -> Result<R, TypeMismatch>;
}

/// Closures whose last parameter is a `Vec<T>` of trailing arguments.
pub trait VariadicCallable<Prefix, T, R>: Send + Sync + 'static {
    fn params() -> Vec<ParamSpec>;
    fn call(&self, args: Vec<Arg>) -> Result<R, TypeMismatch>;
}

fn take<T: Param>(position: usize, arg: Option<Arg>) -> Result<T, TypeMismatch> {
    let found = arg.as_ref().map_or("nothing", Arg::type_name);
    arg.and_then(|a| a.extract::<T>()).ok_or(TypeMismatch {
        position,
        expected: type_name::<T>(),
        found,
    })
}

macro_rules! impl_outputs {
    ($($t:ident),+) => {
        impl<$($t),+> Outputs for ($($t,)+)
        where
            $($t: Any + Send + Sync,)+
        {
            fn slots() -> Vec<SlotSpec> {
                vec![$(SlotSpec::of::<$t>()),+]
            }

            #[allow(non_snake_case)]
            fn into_args(self) -> Vec<Arg> {
                let ($($t,)+) = self;
                vec![$(Arg::new($t)),+]
            }
        }
    };
}

impl_outputs!(R1);
impl_outputs!(R1, R2);
impl_outputs!(R1, R2, R3);
impl_outputs!(R1, R2, R3, R4);
impl_outputs!(R1, R2, R3, R4, R5);
impl_outputs!(R1, R2, R3, R4, R5, R6);

macro_rules! impl_callable {
    ($($p:ident),*) => {
        impl<Func, R, $($p,)*> Callable<($($p,)*), R> for Func
        where
            Func: Fn($($p),*) -> R + Send + Sync + 'static,
            $($p: Param,)*
        {
            fn params() -> Vec<ParamSpec> {
                vec![$(ParamSpec::of::<$p>()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn call(&self, args: Vec<Arg>) -> Result<R, TypeMismatch> {
                let mut args = args.into_iter();
                let mut position = 0;
                $(
                    let $p = take::<$p>(position, args.next())?;
                    position += 1;
                )*
                Ok((self)($($p),*))
            }
        }

        impl<Func, R, T, $($p,)*> VariadicCallable<($($p,)*), T, R> for Func
        where
            Func: Fn($($p,)* Vec<T>) -> R + Send + Sync + 'static,
            T: Param,
            $($p: Param,)*
        {
            fn params() -> Vec<ParamSpec> {
                vec![$(ParamSpec::of::<$p>()),*]
            }

            #[allow(non_snake_case, unused_mut)]
            fn call(&self, args: Vec<Arg>) -> Result<R, TypeMismatch> {
                let mut args = args.into_iter();
                let mut position = 0;
                $(
                    let $p = take::<$p>(position, args.next())?;
                    position += 1;
                )*
                let rest = args
                    .enumerate()
                    .map(|(offset, arg)| take::<T>(position + offset, Some(arg)))
                    .collect::<Result<Vec<T>, _>>()?;
                Ok((self)($($p,)* rest))
            }
        }
    };
}

impl_callable!();
impl_callable!(A1);
impl_callable!(A1, A2);
impl_callable!(A1, A2, A3);
impl_callable!(A1, A2, A3, A4);
impl_callable!(A1, A2, A3, A4, A5);
impl_callable!(A1, A2, A3, A4, A5, A6);
