//! Ordered, single-use stage queue.

use crate::stage::Stage;

/// Executes queued stages in insertion order.
///
/// The queue is emptied by every [`PipelineRunner::run`], so one runner can
/// be reconfigured for the next batch.
#[derive(Default)]
pub struct PipelineRunner {
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineRunner {
    /// Create a runner with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage. No deduplication or ordering checks are done.
    pub fn add_stage(&mut self, stage: Box<dyn Stage>) -> &mut Self {
        self.stages.push(stage);
        self
    }

    /// Number of queued stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every queued stage in order, then clear the queue.
    ///
    /// Returns how many stages were executed.
    pub async fn run(&mut self) -> usize {
        if self.stages.is_empty() {
            tracing::warn!("No stages configured, nothing to run");
            return 0;
        }

        let total = self.stages.len();
        for (i, stage) in self.stages.iter().enumerate() {
            tracing::debug!("Running stage {}/{}", i + 1, total);
            stage.execute().await;
        }

        self.stages.clear();
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recording {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait::async_trait]
    impl Stage for Recording {
        async fn execute(&self) {
            self.log.lock().expect("lock log").push(self.label);
        }
    }

    fn recording(label: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Box<dyn Stage> {
        Box::new(Recording {
            label,
            log: Arc::clone(log),
        })
    }

    /// Log sink shared with a `fmt` subscriber.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("lock sink").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_empty_runner_does_nothing() {
        let sink = Captured::default();
        let writer = sink.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut runner = PipelineRunner::new();
        assert_eq!(runner.run().await, 0);
        assert!(runner.is_empty());

        let logged = String::from_utf8(sink.0.lock().expect("lock sink").clone()).expect("utf8");
        assert!(logged.contains("No stages configured, nothing to run"), "{logged}");
    }

    #[tokio::test]
    async fn test_runs_in_insertion_order_and_clears() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut runner = PipelineRunner::new();
        runner
            .add_stage(recording("capture", &log))
            .add_stage(recording("links", &log))
            .add_stage(recording("enrich", &log));
        assert_eq!(runner.len(), 3);

        assert_eq!(runner.run().await, 3);
        assert_eq!(*log.lock().unwrap(), vec!["capture", "links", "enrich"]);
        assert!(runner.is_empty());

        // A second run has nothing left to do
        assert_eq!(runner.run().await, 0);
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut runner = PipelineRunner::new();
        runner
            .add_stage(recording("links", &log))
            .add_stage(recording("links", &log));

        runner.run().await;
        assert_eq!(*log.lock().unwrap(), vec!["links", "links"]);
    }
}
