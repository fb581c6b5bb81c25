use super::parse::Hit;

/// Consumer boundary for streamed search results.
///
/// The presentation layer implements this; the runtime guarantees the call
/// sequence per request is `results_cleared`, zero or more `result_added` and
/// `search_failed` calls in production order, then exactly one
/// `search_completed`. Events from superseded requests never arrive.
pub trait ResultSink {
    /// Previous results no longer apply; a new request is starting.
    fn results_cleared(&mut self);

    /// One result record, delivered as soon as it was parsed.
    fn result_added(&mut self, hit: Hit);

    /// The request finished; `total` counts every delivered record. Zero is
    /// the distinct "no results" condition.
    fn search_completed(&mut self, total: usize);

    /// One directory's scan failed. Results from sibling directories still
    /// arrive, and `search_completed` still follows.
    fn search_failed(&mut self, message: &str);
}
