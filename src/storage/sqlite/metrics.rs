//! Metrics recording for store operations.

use std::time::Instant;

/// Records `storage_operations_total` and `storage_operation_duration_ms`.
///
/// # Arguments
///
/// * `operation` - Operation name (`count`, `fetch_candidates`, `fetch_deletable`, `delete`)
/// * `start` - Operation start time from `Instant::now()`
/// * `status` - `"success"` or `"error"`
pub fn record_operation_metrics(operation: &'static str, start: Instant, status: &'static str) {
    metrics::counter!(
        "storage_operations_total",
        "backend" => "sqlite",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "storage_operation_duration_ms",
        "backend" => "sqlite",
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}

/// Records metrics for a finished operation and passes its result through.
pub fn observe<T, E>(
    operation: &'static str,
    start: Instant,
    result: Result<T, E>,
) -> Result<T, E> {
    let status = if result.is_ok() { "success" } else { "error" };
    record_operation_metrics(operation, start, status);
    result
}
