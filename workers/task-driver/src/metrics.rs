//! Metric names and tags recorded by the task driver

// ----------------
// | METRIC NAMES |
// ----------------

/// Metric describing the number of tasks started
pub const TASKS_STARTED_METRIC: &str = "gateway_tasks_started";
/// Metric describing the number of tasks run to completion
pub const TASKS_COMPLETED_METRIC: &str = "gateway_tasks_completed";
/// Metric describing the number of tasks that failed
pub const TASKS_FAILED_METRIC: &str = "gateway_tasks_failed";
/// Metric describing the number of transactions broadcast
pub const TRANSACTIONS_SUBMITTED_METRIC: &str = "gateway_transactions_submitted";
/// Metric describing the number of permits signed
pub const PERMITS_SIGNED_METRIC: &str = "gateway_permits_signed";

// ---------------
// | METRIC TAGS |
// ---------------

/// Metric tag for the name of a task
pub const TASK_METRIC_TAG: &str = "task";
