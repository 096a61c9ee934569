//! Generation as a cancellable background task.
//!
//! The pipeline itself is synchronous and quick. The task wraps it with a
//! short artificial delay so a UI has a busy state to show, and lets the
//! user back out before anything is built.

use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::core::pipeline::{GeneratedStory, GenerationError, StoryEngine, StoryInput};
use crate::core::validation::{validate, ValidationIssue};
use crate::state::StoryState;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("generation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationStatus {
    /// Waiting out the delay; the pipeline has not run yet.
    Weaving,
    Completed,
    Cancelled,
    Rejected(Vec<ValidationIssue>),
}

impl GenerationStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Weaving)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TaskConfig {
    pub delay: Duration,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }
}

/// What a finished task hands back. `state` carries the new graph and
/// text when `status` is `Completed`, and is untouched otherwise.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub engine: StoryEngine,
    pub state: StoryState,
    pub story: Option<GeneratedStory>,
    pub status: GenerationStatus,
}

pub struct GenerationTask {
    handle: JoinHandle<GenerationOutcome>,
    cancel_tx: watch::Sender<bool>,
    status_rx: watch::Receiver<GenerationStatus>,
}

impl GenerationTask {
    /// Spawn a generation on the current tokio runtime. Takes ownership of
    /// the engine and state; both come back through [`GenerationTask::wait`].
    ///
    /// An incomplete state is rejected up front: the status starts out as
    /// `Rejected` and the task never enters the delay.
    pub fn spawn(engine: StoryEngine, state: StoryState, config: TaskConfig) -> Self {
        let issues = validate(&StoryInput::from(&state));
        let initial = if issues.is_empty() {
            GenerationStatus::Weaving
        } else {
            GenerationStatus::Rejected(issues)
        };
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (status_tx, status_rx) = watch::channel(initial);
        let handle = tokio::spawn(run(engine, state, config, cancel_rx, status_tx));
        Self {
            handle,
            cancel_tx,
            status_rx,
        }
    }

    pub fn status(&self) -> GenerationStatus {
        self.status_rx.borrow().clone()
    }

    /// A receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<GenerationStatus> {
        self.status_rx.clone()
    }

    /// Ask the task to stop. Has no effect once the pipeline has started.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub async fn wait(self) -> Result<GenerationOutcome, TaskError> {
        Ok(self.handle.await?)
    }
}

async fn cancellation(cancel_rx: &mut watch::Receiver<bool>) {
    let closed = cancel_rx.wait_for(|cancelled| *cancelled).await.is_err();
    if closed {
        // Sender gone without cancelling: never resolve.
        std::future::pending::<()>().await;
    }
}

async fn run(
    mut engine: StoryEngine,
    mut state: StoryState,
    config: TaskConfig,
    mut cancel_rx: watch::Receiver<bool>,
    status_tx: watch::Sender<GenerationStatus>,
) -> GenerationOutcome {
    let initial = status_tx.borrow().clone();
    if initial.is_finished() {
        info!(status = ?initial, "generation rejected before weaving");
        return GenerationOutcome {
            engine,
            state,
            story: None,
            status: initial,
        };
    }

    let cancelled = tokio::select! {
        biased;
        _ = cancellation(&mut cancel_rx) => true,
        _ = tokio::time::sleep(config.delay) => false,
    };

    if cancelled {
        info!("generation cancelled before weaving");
        status_tx.send_replace(GenerationStatus::Cancelled);
        return GenerationOutcome {
            engine,
            state,
            story: None,
            status: GenerationStatus::Cancelled,
        };
    }

    let (story, status) = match engine.generate(&state) {
        Ok(story) => {
            state.apply_generated(&story);
            (Some(story), GenerationStatus::Completed)
        }
        Err(GenerationError::Invalid(issues)) => (None, GenerationStatus::Rejected(issues)),
    };
    status_tx.send_replace(status.clone());

    GenerationOutcome {
        engine,
        state,
        story,
        status,
    }
}
