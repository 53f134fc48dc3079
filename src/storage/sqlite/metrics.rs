//! Storage operation metrics.

use std::time::Instant;

/// Records `storage_operations_total` and `storage_operation_duration_ms`
/// for one store operation.
///
/// # Arguments
///
/// * `backend` - Backend name (e.g., "sqlite", "memory")
/// * `operation` - Operation name (e.g., "exists", "insert", "stats")
/// * `start` - Operation start time from `Instant::now()`
/// * `status` - "success" or "error"
pub fn record_operation_metrics(
    backend: &'static str,
    operation: &'static str,
    start: Instant,
    status: &'static str,
) {
    metrics::counter!(
        "storage_operations_total",
        "backend" => backend,
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "storage_operation_duration_ms",
        "backend" => backend,
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_recorder_is_noop() {
        // No global recorder is installed in unit tests; recording must not panic
        let start = Instant::now();
        record_operation_metrics("sqlite", "exists", start, "success");
        record_operation_metrics("sqlite", "insert", start, "error");
    }
}
