//! Execute a query with tagged parameters on a pooled connection.

use query_engine_sql::sql::{ErrorCode, ResultSet, Value};
use query_engine_translation::translation::params;
use tracing::{debug, info_span, warn};

use crate::backend::{vendor_message, Backend};
use crate::pool::Pool;

/// Run `query` with positional parameters `$1, $2, ...` bound to `params`.
///
/// This never fails: every outcome, including an exhausted pool, is reported through the
/// status of the returned result set. The connection goes back to the pool before returning.
pub fn execute<B: Backend>(pool: &Pool<B>, query: &str, params: &[Value]) -> ResultSet {
    let vendor = pool.backend().name();
    let span = info_span!("execute", backend = vendor, params = params.len());
    let _enter = span.enter();

    let Some(mut connection) = pool.acquire() else {
        return ResultSet::new(
            ErrorCode::Fatal,
            format!(
                "Could not get connection from connection pool. Connection available: [{}]. Connection count: [{}]",
                pool.available(),
                pool.capacity()
            ),
        );
    };

    let wire_params = match params::serialize_params(params) {
        Ok(wire_params) => wire_params,
        Err(error) => {
            warn!(%error, "rejected query parameters");
            return ResultSet::new(
                ErrorCode::InvalidType,
                vendor_message("Query has an unsupported parameter", vendor, &error.to_string()),
            );
        }
    };

    let result = pool
        .backend()
        .execute(&mut connection, query, &wire_params);
    connection.release();

    if let Some(metrics) = pool.metrics() {
        metrics.query_total.inc();
        if result.code().is_error() {
            metrics.query_failures_total.inc();
        }
    }

    if result.code().is_error() {
        warn!(code = %result.code(), message = result.message(), "query failed");
    } else {
        debug!(
            code = %result.code(),
            rows = result.row_count(),
            fields = result.field_count(),
            "query executed"
        );
    }
    result
}
