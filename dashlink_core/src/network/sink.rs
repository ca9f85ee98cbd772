use crate::datastore::OutputBuffer;
use parking_lot::Mutex;
use std::sync::Arc;

/// Destination for the output buffer at the end of each tick.
///
/// Sends are fire-and-forget: an implementation swallows its own failures,
/// the next tick simply sends again.
pub trait OutputSink: Send {
    fn send_output(&self, output: &OutputBuffer);
}

impl<S: OutputSink + Sync + ?Sized> OutputSink for Arc<S> {
    fn send_output(&self, output: &OutputBuffer) {
        (**self).send_output(output)
    }
}

/// In-memory sink keeping every sent buffer, for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All buffers sent so far, oldest first
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().clone()
    }

    pub fn last(&self) -> Option<Vec<u8>> {
        self.sent.lock().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl OutputSink for RecordingSink {
    fn send_output(&self, output: &OutputBuffer) {
        self.sent.lock().push(output.get_output());
    }
}
