use std::time::Duration;

use tracing::{debug, info, warn};

/// Events emitted by [`super::Pipeline::execute`], in order.
///
/// Step indexes are zero-based registration positions.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent<'a> {
    RunStarted {
        steps: usize,
        rows: usize,
    },
    StepStarted {
        index: usize,
        name: &'a str,
    },
    StepSucceeded {
        index: usize,
        name: &'a str,
        rows_after: usize,
        elapsed: Duration,
    },
    StepFailed {
        index: usize,
        name: &'a str,
        error: &'a str,
        elapsed: Duration,
    },
    RunFinished {
        /// Steps that completed successfully.
        completed: usize,
        failed: bool,
        elapsed: Duration,
    },
}

/// Observer hook for pipeline events.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent<'_>);
}

/// Forwards pipeline events to `tracing` under the `rust_data_cleaning::pipeline` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPipelineObserver;

impl PipelineObserver for TracingPipelineObserver {
    fn on_event(&self, event: &PipelineEvent<'_>) {
        match *event {
            PipelineEvent::RunStarted { steps, rows } => {
                debug!(target: "rust_data_cleaning::pipeline", steps, rows, "run started")
            }
            PipelineEvent::StepStarted { index, name } => {
                debug!(target: "rust_data_cleaning::pipeline", index, step = name, "step started")
            }
            PipelineEvent::StepSucceeded {
                index,
                name,
                rows_after,
                elapsed,
            } => info!(
                target: "rust_data_cleaning::pipeline",
                index,
                step = name,
                rows_after,
                ?elapsed,
                "step succeeded"
            ),
            PipelineEvent::StepFailed {
                index,
                name,
                error,
                elapsed,
            } => warn!(
                target: "rust_data_cleaning::pipeline",
                index,
                step = name,
                error,
                ?elapsed,
                "step failed"
            ),
            PipelineEvent::RunFinished {
                completed,
                failed,
                elapsed,
            } => info!(
                target: "rust_data_cleaning::pipeline",
                completed,
                failed,
                ?elapsed,
                "run finished"
            ),
        }
    }
}
