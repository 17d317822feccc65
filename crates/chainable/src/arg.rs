//! Arg: type-erased value flowing between links
use crate::error::Fault;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A dynamically-typed argument, or the nil marker.
///
/// Cloning an `Arg` clones the shared handle; the held value is never copied.
#[derive(Clone)]
pub struct Arg {
    value: Option<Arc<dyn Any + Send + Sync>>,
    type_name: &'static str,
}

impl Arg {
    /// Wraps a value.
    ///
    /// An `Arg` passed in is returned as is, and an error slot value
    /// (`Option<Fault>`) becomes nil or a held `Fault`.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        let boxed: Box<dyn Any + Send + Sync> = Box::new(value);

        let boxed = match boxed.downcast::<Arg>() {
            Ok(arg) => return *arg,
            Err(other) => other,
        };

        match boxed.downcast::<Option<Fault>>() {
            Ok(slot) => match *slot {
                Some(fault) => Self::shared(Arc::new(fault)),
                None => Self::nil(),
            },
            Err(other) => Self {
                value: Some(Arc::from(other)),
                type_name: type_name::<T>(),
            },
        }
    }

    /// The nil marker.
    pub fn nil() -> Self {
        Self {
            value: None,
            type_name: "nil",
        }
    }

    /// Wraps an already shared value without any normalization.
    pub(crate) fn shared<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value: Some(value),
            type_name: type_name::<T>(),
        }
    }

    pub fn is_nil(&self) -> bool {
        self.value.is_none()
    }

    /// Type name of the held value, `"nil"` for the nil marker.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.as_deref()?.downcast_ref::<T>()
    }

    /// Clones the held value out if it is a `T`.
    pub fn get<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    /// Extracts a parameter value of type `T`.
    ///
    /// An `Arg` parameter takes the argument as is, and a held `Fault`
    /// satisfies an `Option<Fault>` parameter.
    pub(crate) fn extract<T: Any + Clone>(&self) -> Option<T> {
        if let Some(v) = self.value.as_deref().and_then(|v| v.downcast_ref::<T>()) {
            return Some(v.clone());
        }

        if TypeId::of::<T>() == TypeId::of::<Arg>() {
            let arg: Box<dyn Any> = Box::new(self.clone());
            return arg.downcast::<T>().ok().map(|v| *v);
        }

        let fault = self.value.as_deref()?.downcast_ref::<Fault>()?;
        let slot: Box<dyn Any> = Box::new(Some(fault.clone()));
        slot.downcast::<T>().ok().map(|v| *v)
    }
}

impl Default for Arg {
    fn default() -> Self {
        Self::nil()
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fault) = self.downcast_ref::<Fault>() {
            return write!(f, "Arg(Fault: {})", fault);
        }
        write!(f, "Arg({})", self.type_name)
    }
}

impl From<crate::function::Function> for Arg {
    fn from(function: crate::function::Function) -> Self {
        Self::shared(Arc::new(function))
    }
}

/// Builds a `Vec<Arg>` from a list of expressions.
///
/// ```
/// use chainable::{args, Arg};
///
/// let args = args![1, "two", Arg::nil()];
/// assert_eq!(args.len(), 3);
/// assert!(args[2].is_nil());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::new($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: i32,
    }

    #[test]
    fn test_new_and_get() {
        let arg = Arg::new(Point { x: 3 });
        assert_eq!(arg.get::<Point>(), Some(Point { x: 3 }));
        assert_eq!(arg.get::<i32>(), None);
        assert!(arg.type_name().ends_with("Point"));
    }

    #[test]
    fn test_nested_arg_is_not_rewrapped() {
        let arg = Arg::new(Arg::new(7u8));
        assert_eq!(arg.get::<u8>(), Some(7));

        assert!(Arg::new(Arg::nil()).is_nil());
    }

    #[test]
    fn test_error_slot_normalization() {
        assert!(Arg::new(None::<Fault>).is_nil());

        let fault = Fault::msg("boom");
        let arg = Arg::new(Some(fault.clone()));
        assert!(Fault::same(arg.downcast_ref::<Fault>().unwrap(), &fault));
    }

    #[test]
    fn test_fault_satisfies_error_parameter() {
        let fault = Fault::msg("boom");
        let arg = Arg::new(fault.clone());

        let slot = arg.extract::<Option<Fault>>().unwrap();
        assert!(Fault::same(&slot.unwrap(), &fault));
        assert!(arg.extract::<String>().is_none());
    }

    #[test]
    fn test_arg_parameter_takes_any_value() {
        let arg = Arg::new(5);
        let taken = arg.extract::<Arg>().unwrap();
        assert_eq!(taken.get::<i32>(), Some(5));

        let held_nil = Arg::shared(Arc::new(Arg::nil()));
        assert!(held_nil.extract::<Arg>().unwrap().is_nil());
    }

    #[test]
    fn test_clone_shares_value() {
        let arg = Arg::new(String::from("shared"));
        let copy = arg.clone();
        let a = arg.downcast_ref::<String>().unwrap() as *const String;
        let b = copy.downcast_ref::<String>().unwrap() as *const String;
        assert_eq!(a, b);
    }
}
