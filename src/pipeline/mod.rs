//! Sequential transformation pipeline with fail-fast error reporting.
//!
//! A [`Pipeline`] is an ordered list of named [`Transform`]s. [`Pipeline::execute`] runs them
//! over a working copy of the input table:
//!
//! - each step receives the previous step's output
//! - a successful step is recorded as [`StepStatus::Success`]
//! - the first failing step is recorded as [`StepStatus::Failed`] and the run stops; the
//!   returned table is the output of the last successful step
//!
//! The caller's table is never modified, so executing again always starts from the original
//! input.
//!
//! ```rust
//! use rust_data_cleaning::error::StepError;
//! use rust_data_cleaning::pipeline::Pipeline;
//! use rust_data_cleaning::types::{DataType, Field, Table, Value};
//!
//! let input = Table::from_columns(vec![(
//!     Field::new("score", DataType::Int64),
//!     vec![Value::Int64(3), Value::Null, Value::Int64(7)],
//! )]);
//!
//! let mut pipeline = Pipeline::new();
//! pipeline
//!     .add_step("drop nulls", |t: &Table| -> Result<Table, StepError> {
//!         Ok(t.filter_rows(|row| !row[0].is_null()))
//!     })
//!     .add_step("require rows", |t: &Table| {
//!         if t.is_empty() {
//!             Err(StepError::msg("no rows left"))
//!         } else {
//!             Ok(t.clone())
//!         }
//!     });
//!
//! let run = pipeline.execute(&input);
//! assert!(run.succeeded());
//! assert_eq!(run.table.row_count(), 2);
//! assert_eq!(input.row_count(), 3);
//! ```

mod observer;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StepExecutionError, StepResult};
use crate::types::Table;

pub use observer::{PipelineEvent, PipelineObserver, TracingPipelineObserver};

/// A pure table transformation usable as a pipeline step.
///
/// Any `Fn(&Table) -> StepResult<Table>` closure is a `Transform`.
pub trait Transform: Send + Sync {
    fn apply(&self, table: &Table) -> StepResult<Table>;
}

impl<F> Transform for F
where
    F: Fn(&Table) -> StepResult<Table> + Send + Sync,
{
    fn apply(&self, table: &Table) -> StepResult<Table> {
        self(table)
    }
}

/// A named transform. Names are for reporting only; duplicates are allowed.
#[derive(Clone)]
pub struct PipelineStep {
    name: String,
    transform: Arc<dyn Transform>,
}

impl PipelineStep {
    pub fn new(name: impl Into<String>, transform: impl Transform + 'static) -> Self {
        Self {
            name: name.into(),
            transform: Arc::new(transform),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, table: &Table) -> StepResult<Table> {
        self.transform.apply(table)
    }
}

impl fmt::Debug for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineStep").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Result of running one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Success { rows_after: usize },
    Failed { error: String },
}

/// Log entry for one executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Zero-based position of the step in the pipeline.
    pub index: usize,
    pub name: String,
    pub status: StepStatus,
    pub elapsed: Duration,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, StepStatus::Success { .. })
    }

    /// The failure as an error value, or `None` for a successful step.
    pub fn as_error(&self) -> Option<StepExecutionError> {
        match &self.status {
            StepStatus::Failed { error } => Some(StepExecutionError {
                step: self.name.clone(),
                index: self.index,
                message: error.clone(),
            }),
            StepStatus::Success { .. } => None,
        }
    }
}

/// Output of [`Pipeline::execute`]: the resulting table plus the outcome log.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    /// Output of the last successful step (or a copy of the input if none succeeded).
    pub table: Table,
    /// One entry per step that ran, in execution order.
    pub outcomes: Vec<StepOutcome>,
}

impl PipelineRun {
    /// `true` if no step failed (including the zero-step case).
    pub fn succeeded(&self) -> bool {
        self.failure().is_none()
    }

    /// The failed step's outcome, if any. Always the last entry.
    pub fn failure(&self) -> Option<&StepOutcome> {
        self.outcomes.last().filter(|o| !o.is_success())
    }

    /// Total time spent inside steps.
    pub fn elapsed(&self) -> Duration {
        self.outcomes.iter().map(|o| o.elapsed).sum()
    }

    /// Treat a failed run as an error, discarding the partial table.
    pub fn into_result(self) -> Result<Table, StepExecutionError> {
        if let Some(err) = self.failure().and_then(StepOutcome::as_error) {
            return Err(err);
        }
        Ok(self.table)
    }
}

/// Ordered list of named steps.
///
/// `Pipeline` is `Send + Sync`; one pipeline can execute independent tables from several
/// threads at once.
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an observer for run/step events.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Append a step.
    pub fn add_step(&mut self, name: impl Into<String>, transform: impl Transform + 'static) -> &mut Self {
        self.steps.push(PipelineStep::new(name, transform));
        self
    }

    /// Builder-style [`Pipeline::add_step`].
    pub fn with_step(mut self, name: impl Into<String>, transform: impl Transform + 'static) -> Self {
        self.add_step(name, transform);
        self
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order over a copy of `input`, stopping at the first failure.
    ///
    /// Never returns an error: failures are recorded in [`PipelineRun::outcomes`]. Use
    /// [`PipelineRun::into_result`] to turn a failed run into a [`StepExecutionError`].
    pub fn execute(&self, input: &Table) -> PipelineRun {
        let run_start = Instant::now();
        debug!(steps = self.steps.len(), rows = input.row_count(), "pipeline run started");
        self.emit(&PipelineEvent::RunStarted {
            steps: self.steps.len(),
            rows: input.row_count(),
        });

        let mut current = input.clone();
        let mut outcomes = Vec::with_capacity(self.steps.len());

        for (index, step) in self.steps.iter().enumerate() {
            self.emit(&PipelineEvent::StepStarted {
                index,
                name: step.name(),
            });

            let start = Instant::now();
            let result = step.apply(&current);
            let elapsed = start.elapsed();

            match result {
                Ok(next) => {
                    let rows_after = next.row_count();
                    debug!(index, step = step.name(), rows_after, ?elapsed, "pipeline step succeeded");
                    self.emit(&PipelineEvent::StepSucceeded {
                        index,
                        name: step.name(),
                        rows_after,
                        elapsed,
                    });
                    outcomes.push(StepOutcome {
                        index,
                        name: step.name.clone(),
                        status: StepStatus::Success { rows_after },
                        elapsed,
                    });
                    current = next;
                }
                Err(err) => {
                    let error = err.to_string();
                    warn!(index, step = step.name(), %error, "pipeline step failed; halting");
                    self.emit(&PipelineEvent::StepFailed {
                        index,
                        name: step.name(),
                        error: &error,
                        elapsed,
                    });
                    outcomes.push(StepOutcome {
                        index,
                        name: step.name.clone(),
                        status: StepStatus::Failed { error },
                        elapsed,
                    });
                    break;
                }
            }
        }

        let run = PipelineRun {
            table: current,
            outcomes,
        };
        let failed = !run.succeeded();
        let completed = run.outcomes.len() - usize::from(failed);
        let elapsed = run_start.elapsed();
        info!(completed, failed, rows = run.table.row_count(), ?elapsed, "pipeline run finished");
        self.emit(&PipelineEvent::RunFinished {
            completed,
            failed,
            elapsed,
        });

        run
    }

    fn emit(&self, event: &PipelineEvent<'_>) {
        if let Some(obs) = &self.observer {
            obs.on_event(event);
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.steps)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}
