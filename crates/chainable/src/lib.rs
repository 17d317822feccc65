//! Chainable: dynamic function-composition pipeline
//!
//! A [`Chain`] holds an ordered list of type-erased callables ("links") and a
//! set of initial arguments. [`Chain::unwrap`] runs the links in order, each
//! one receiving exactly what its predecessor returned.
//!
//! ```text
//! from(args) → link₀ → args₁ → link₁ → args₂ → … → outputs | ChainError
//! ```
//!
//! Links added with [`Chain::chain`] treat an error-typed trailing return slot
//! (`Option<Fault>`) as the link's outcome: a `Some` aborts the chain, a `None`
//! is stripped from the outputs. Links added with [`Chain::chain_dummy`] pass
//! that slot on as ordinary data.
//!
//! # Example
//!
//! ```
//! use chainable::{args, Chain, ChainError, Fault, Function};
//!
//! let parse = Function::multi(|s: String| match s.parse::<i32>() {
//!     Ok(n) => (n, None),
//!     Err(e) => (0, Some(Fault::new(e))),
//! });
//!
//! let out = Chain::new()
//!     .from(args![String::from("20")])
//!     .chain([parse.clone(), Function::new(|n: i32| n + 1)])
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(out[0].get::<i32>(), Some(21));
//!
//! let err = Chain::new()
//!     .from(args![String::from("twenty")])
//!     .chain([parse])
//!     .unwrap()
//!     .unwrap_err();
//! assert!(matches!(err, ChainError::Link { link_index: 0, .. }));
//! assert_eq!(err.outputs()[0].get::<i32>(), Some(0));
//! ```

pub mod arg;
pub mod chain;
pub mod error;
pub mod function;
pub mod invoke;
pub mod report;

pub use arg::Arg;
pub use chain::{Chain, Link};
pub use error::{ChainError, Fault};
pub use function::{Arity, Function, Param, Signature};
pub use report::{LinkRecord, RunReport, RunState};

/// Crate version
pub const CHAINABLE_VERSION: &str = env!("CARGO_PKG_VERSION");
