//! The unit of work the runner sequences.

/// One pipeline stage.
///
/// `execute` has no return value: a stage logs its own failures and leaves
/// its artifact unwritten, and the next stage discovers that when its input
/// is missing.
#[async_trait::async_trait]
pub trait Stage: Send + Sync {
    /// Run the stage to completion.
    async fn execute(&self);
}
