//! Pipeline Sequencer: chain builder and `unwrap`
use crate::arg::Arg;
use crate::error::ChainError;
use crate::function::Function;
use crate::invoke::invoke;
use crate::report::{LinkRecord, RunReport, RunState};
use std::time::Instant;
use tracing::{debug, debug_span};
use uuid::Uuid;

/// One element of a chain plus its error disposition.
#[derive(Debug, Clone)]
pub struct Link {
    element: Arg,
    handle_error: bool,
}

impl Link {
    pub fn element(&self) -> &Arg {
        &self.element
    }

    pub fn handle_error(&self) -> bool {
        self.handle_error
    }

    fn label(&self) -> Option<&str> {
        self.element.downcast_ref::<Function>().map(Function::name)
    }
}

/// Ordered links fed by a set of initial arguments.
///
/// ```
/// use chainable::{args, Chain, Function};
///
/// let out = Chain::new()
///     .from(args![4])
///     .chain([
///         Function::new(|x: i32| x + 2),
///         Function::new(|x: i32| x * 2),
///     ])
///     .unwrap()
///     .unwrap();
/// assert_eq!(out[0].get::<i32>(), Some(12));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Chain {
    name: Option<String>,
    initial: Vec<Arg>,
    links: Vec<Link>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the chain in logs and run reports.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the arguments of the first link, replacing any previous ones.
    pub fn from<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        self.initial = args.into_iter().map(Into::into).collect();
        self
    }

    /// Appends links whose error-typed trailing return aborts the chain.
    pub fn chain<I>(self, funcs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        self.push_links(funcs, true)
    }

    /// Appends links whose trailing return is always passed on as data.
    pub fn chain_dummy<I>(self, funcs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        self.push_links(funcs, false)
    }

    fn push_links<I>(mut self, funcs: I, handle_error: bool) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        self.links.extend(funcs.into_iter().map(|f| Link {
            element: f.into(),
            handle_error,
        }));
        self
    }

    /// Clears the initial arguments and every link.
    pub fn reset(mut self) -> Self {
        self.initial.clear();
        self.links.clear();
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn initial_arguments(&self) -> &[Arg] {
        &self.initial
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Link names joined in execution order, `?` for non-functions.
    pub fn pipeline_id(&self) -> String {
        self.links
            .iter()
            .map(|link| link.label().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join("→")
    }

    /// Runs every link in order, feeding each one the outputs of the previous.
    ///
    /// Stops at the first failing link. Links are not consumed, so calling
    /// `unwrap` again re-runs the same chain.
    pub fn unwrap(&self) -> Result<Vec<Arg>, ChainError> {
        self.run(None)
    }

    /// Like [`Chain::unwrap`], also returning a record of every attempted link.
    pub fn unwrap_traced(&self) -> (Result<Vec<Arg>, ChainError>, RunReport) {
        let mut report = RunReport::new(self.name.clone(), self.pipeline_id());
        let result = self.run(Some(&mut report));
        (result, report)
    }

    fn run(&self, mut report: Option<&mut RunReport>) -> Result<Vec<Arg>, ChainError> {
        let run_id = match report.as_deref() {
            Some(r) => r.run_id.clone(),
            None => Uuid::new_v4().to_string(),
        };
        let span = debug_span!("chain", name = self.name.as_deref().unwrap_or("-"), %run_id);
        let _enter = span.enter();

        debug!(links = self.links.len(), args = self.initial.len(), "chain started");

        let mut current = self.initial.clone();

        for (index, link) in self.links.iter().enumerate() {
            if let Some(r) = report.as_deref_mut() {
                r.state = RunState::Running { link_index: index };
            }

            let start = Instant::now();
            let n_args = current.len();
            let result = invoke(index, &link.element, current, link.handle_error);

            if let Some(r) = report.as_deref_mut() {
                r.links.push(LinkRecord {
                    index,
                    name: link.label().map(str::to_string),
                    handle_error: link.handle_error,
                    n_args,
                    n_outputs: match &result {
                        Ok(outputs) => outputs.len(),
                        Err(err) => err.outputs().len(),
                    },
                    latency_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                    failed: result.is_err(),
                });
            }

            current = match result {
                Ok(outputs) => outputs,
                Err(err) => {
                    debug!(link_index = index, error = %err, "chain failed");
                    if let Some(r) = report.as_deref_mut() {
                        r.state = RunState::Failed { link_index: index };
                    }
                    return Err(err);
                }
            };
        }

        debug!(outputs = current.len(), "chain completed");
        if let Some(r) = report {
            r.state = RunState::Completed;
        }

        Ok(current)
    }
}
