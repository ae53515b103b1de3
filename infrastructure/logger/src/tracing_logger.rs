use business::domain::logger::Logger;
use tracing::{debug, error, info, warn};

/// `Logger` port backed by `tracing`; every message lands under the
/// `image_worker` target so it can be filtered with `RUST_LOG`.
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        info!(target: "image_worker", "{}", message);
    }
    fn warn(&self, message: &str) {
        warn!(target: "image_worker", "{}", message);
    }
    fn error(&self, message: &str) {
        error!(target: "image_worker", "{}", message);
    }
    fn debug(&self, message: &str) {
        debug!(target: "image_worker", "{}", message);
    }
}
