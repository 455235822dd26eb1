//! The task driver steps a task from its initial state to completion
//!
//! Tasks run inline on the caller's runtime; each request handler drives its
//! own task and awaits the result

use tracing::{error, info, instrument, warn};

use crate::{
    metrics::{TASK_METRIC_TAG, TASKS_COMPLETED_METRIC, TASKS_FAILED_METRIC, TASKS_STARTED_METRIC},
    traits::{Task, TaskContext, TaskState},
};

/// Drives tasks to completion
#[derive(Clone)]
pub struct TaskDriver {
    /// The context each task is built with
    ctx: TaskContext,
}

impl TaskDriver {
    /// Constructor
    pub fn new(ctx: TaskContext) -> Self {
        Self { ctx }
    }

    /// The context tasks are built with
    pub fn context(&self) -> &TaskContext {
        &self.ctx
    }

    /// Build a task from its descriptor and run it to completion
    #[instrument(skip_all)]
    pub async fn run<T: Task>(&self, descriptor: T::Descriptor) -> Result<T::Output, T::Error> {
        let mut task = T::new(descriptor, self.ctx.clone()).await?;
        let name = task.name();
        metrics::counter!(TASKS_STARTED_METRIC, TASK_METRIC_TAG => name.clone()).increment(1);

        let res = Self::run_to_completion(&mut task).await;
        match res {
            Ok(()) => {
                metrics::counter!(TASKS_COMPLETED_METRIC, TASK_METRIC_TAG => name).increment(1);
                task.into_output()
            },
            Err(e) => {
                metrics::counter!(TASKS_FAILED_METRIC, TASK_METRIC_TAG => name.clone())
                    .increment(1);
                let state = task.state();
                error!("task {name} failed in state {state}: {e}");
                if state.committed() {
                    warn!("task {name} failed after its commit point; on-chain effects stand");
                }

                Err(e)
            },
        }
    }

    /// Step a task until it completes or a step fails
    async fn run_to_completion<T: Task>(task: &mut T) -> Result<(), T::Error> {
        let name = task.name();
        while !task.completed() {
            task.step().await?;
            let new_state = task.state();
            info!("task {name} transitioning to state {new_state}");
        }

        Ok(())
    }
}
