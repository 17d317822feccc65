//! Unified Error Model
use crate::arg::Arg;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// An error value produced by a link.
///
/// `Option<Fault>` is the error-typed return slot: `None` means "no error".
#[derive(Clone)]
pub struct Fault(Arc<anyhow::Error>);

impl Fault {
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Arc::new(anyhow::Error::new(error)))
    }

    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self(Arc::new(anyhow::Error::msg(message)))
    }

    /// Returns the underlying error if it is an `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.0.downcast_ref::<E>()
    }

    /// Whether both handles point at the same error value.
    pub fn same(a: &Fault, b: &Fault) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl From<anyhow::Error> for Fault {
    fn from(error: anyhow::Error) -> Self {
        Self(Arc::new(error))
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

// Transparent over the wrapped error: `Display` and `source` both forward to
// it, so a chain walk from `ChainError::Link` goes Link, Fault, then the
// wrapped error's own cause. Reach the wrapped error with `downcast_ref`.
impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// Failure of a chain run.
///
/// `NotAFunction`, `ArgumentMismatch` and `TypeMismatch` are structural: the
/// link itself is malformed and was never invoked. `Link` carries an error
/// value returned by a link that ran.
#[derive(Error, Debug, Clone)]
pub enum ChainError {
    #[error("(Error on Link: {link_index}) Element isn't a function")]
    NotAFunction { link_index: usize },

    #[error("(Error on Link: {link_index}) {n_args} arg(s) provided, but function arity is {fn_arity}")]
    ArgumentMismatch {
        link_index: usize,
        n_args: usize,
        fn_arity: usize,
    },

    #[error("(Error on Link: {link_index}) arg {position} is `{found}`, but function expects `{expected}`")]
    TypeMismatch {
        link_index: usize,
        position: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{fault}")]
    Link {
        link_index: usize,
        #[source]
        fault: Fault,
        outputs: Vec<Arg>,
    },
}

impl ChainError {
    pub fn link_index(&self) -> usize {
        match self {
            Self::NotAFunction { link_index }
            | Self::ArgumentMismatch { link_index, .. }
            | Self::TypeMismatch { link_index, .. }
            | Self::Link { link_index, .. } => *link_index,
        }
    }

    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Link { .. })
    }

    /// The error value returned by the failing link, if any.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            Self::Link { fault, .. } => Some(fault),
            _ => None,
        }
    }

    /// Partial outputs of the failing link. Empty for structural errors.
    pub fn outputs(&self) -> &[Arg] {
        match self {
            Self::Link { outputs, .. } => outputs,
            _ => &[],
        }
    }

    pub fn into_outputs(self) -> Vec<Arg> {
        match self {
            Self::Link { outputs, .. } => outputs,
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("disk on fire")]
    struct DiskError;

    #[derive(Debug, Error)]
    #[error("config unreadable")]
    struct ConfigError(#[source] std::io::Error);

    #[test]
    fn test_link_error_source_chain() {
        let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ChainError::Link {
            link_index: 0,
            fault: Fault::new(ConfigError(cause)),
            outputs: Vec::new(),
        };

        let mut messages = Vec::new();
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(&err);
        while let Some(e) = current {
            messages.push(e.to_string());
            current = e.source();
        }

        assert_eq!(
            messages,
            vec!["config unreadable", "config unreadable", "no such file"]
        );
        assert!(err.fault().unwrap().downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_not_a_function_error() {
        let err = ChainError::NotAFunction { link_index: 1 };
        assert_eq!(err.to_string(), "(Error on Link: 1) Element isn't a function");
        assert!(err.is_structural());
    }

    #[test]
    fn test_argument_mismatch_error() {
        let err = ChainError::ArgumentMismatch {
            link_index: 1,
            n_args: 2,
            fn_arity: 3,
        };
        assert_eq!(
            err.to_string(),
            "(Error on Link: 1) 2 arg(s) provided, but function arity is 3"
        );
        assert_eq!(err.link_index(), 1);
        assert!(err.outputs().is_empty());
    }

    #[test]
    fn test_type_mismatch_error() {
        let err = ChainError::TypeMismatch {
            link_index: 0,
            position: 1,
            expected: "i32",
            found: "&str",
        };
        assert_eq!(
            err.to_string(),
            "(Error on Link: 0) arg 1 is `&str`, but function expects `i32`"
        );
    }

    #[test]
    fn test_link_error_keeps_fault_and_outputs() {
        let fault = Fault::new(DiskError);
        let err = ChainError::Link {
            link_index: 2,
            fault: fault.clone(),
            outputs: vec![Arg::new(5)],
        };

        assert_eq!(err.to_string(), "disk on fire");
        assert!(!err.is_structural());
        assert!(Fault::same(err.fault().unwrap(), &fault));
        assert!(err.fault().unwrap().downcast_ref::<DiskError>().is_some());
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.into_outputs()[0].get::<i32>(), Some(5));
    }
}
