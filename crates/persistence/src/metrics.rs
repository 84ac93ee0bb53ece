//! Document store and blob storage metrics.

use metrics::{counter, histogram};
use std::time::Instant;

/// Records how long a store operation took.
pub fn record_store_duration(backend: &'static str, operation: &'static str, duration_secs: f64) {
    histogram!(
        "document_store_operation_duration_seconds",
        "backend" => backend,
        "operation" => operation
    )
    .record(duration_secs);
}

/// Counts a failed store operation by error kind.
pub fn record_store_error(backend: &'static str, operation: &'static str, kind: &'static str) {
    counter!(
        "document_store_errors_total",
        "backend" => backend,
        "operation" => operation,
        "kind" => kind
    )
    .increment(1);
}

/// Counts blob writes and deletes.
pub fn record_blob_operation(operation: &'static str, outcome: &'static str) {
    counter!(
        "blob_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Times one store call.
///
/// ```ignore
/// let timer = StoreTimer::new("postgres", "list");
/// let result = query.fetch_all(&pool).await;
/// timer.record();
/// ```
pub struct StoreTimer {
    backend: &'static str,
    operation: &'static str,
    start: Instant,
}

impl StoreTimer {
    pub fn new(backend: &'static str, operation: &'static str) -> Self {
        Self {
            backend,
            operation,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_store_duration(self.backend, self.operation, self.start.elapsed().as_secs_f64());
    }

    /// Records the duration and, for errors, the error kind.
    pub fn finish<T>(
        self,
        result: Result<T, crate::error::StoreError>,
    ) -> Result<T, crate::error::StoreError> {
        if let Err(e) = &result {
            record_store_error(self.backend, self.operation, e.kind());
        }
        self.record();
        result
    }
}
