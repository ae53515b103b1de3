/// Logging port used by use cases.
///
/// Keeps the business crate free of a concrete logging backend; the worker
/// injects `TracingLogger`.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn debug(&self, message: &str);
}
