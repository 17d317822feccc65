//! Invocation Engine: calls one link with one argument sequence
use crate::arg::Arg;
use crate::error::{ChainError, Fault};
use crate::function::Function;
use tracing::trace;

/// Invokes the element of link `link_index` with `args`.
///
/// Structural errors are raised before the callable runs. When
/// `handle_error` is set and the last declared return slot is error-typed,
/// that slot is stripped from the outputs; a non-nil value in it becomes
/// `ChainError::Link` carrying the remaining outputs.
pub fn invoke(
    link_index: usize,
    element: &Arg,
    args: Vec<Arg>,
    handle_error: bool,
) -> Result<Vec<Arg>, ChainError> {
    let function = element
        .downcast_ref::<Function>()
        .ok_or(ChainError::NotAFunction { link_index })?;

    let signature = function.signature();
    let arity = signature.arity();
    if !arity.accepts(args.len()) {
        return Err(ChainError::ArgumentMismatch {
            link_index,
            n_args: args.len(),
            fn_arity: arity.fixed(),
        });
    }

    let args = marshal(function, args);

    trace!(
        link_index,
        function = function.name(),
        n_args = args.len(),
        "invoking link"
    );

    let mut outputs = function
        .call(args)
        .map_err(|mismatch| ChainError::TypeMismatch {
            link_index,
            position: mismatch.position,
            expected: mismatch.expected,
            found: mismatch.found,
        })?;

    if !(handle_error && signature.returns_error()) {
        return Ok(outputs);
    }

    let fault = outputs
        .pop()
        .and_then(|slot| slot.downcast_ref::<Fault>().cloned());

    match fault {
        Some(fault) => Err(ChainError::Link {
            link_index,
            fault,
            outputs,
        }),
        None => Ok(outputs),
    }
}

/// Replaces nil arguments with the zero value of the declared parameter type.
fn marshal(function: &Function, args: Vec<Arg>) -> Vec<Arg> {
    let signature = function.signature();
    args.into_iter()
        .enumerate()
        .map(|(position, arg)| match signature.param(position) {
            Some(param) if arg.is_nil() => param.zero(),
            _ => arg,
        })
        .collect()
}
