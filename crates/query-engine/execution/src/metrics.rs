//! Metrics setup and update for the pool and the execution engine.

use prometheus::core::{AtomicI64, AtomicU64, GenericCounter, GenericGauge};

#[derive(Debug, Clone)]
pub struct Metrics {
    pub query_total: GenericCounter<AtomicU64>,
    pub query_failures_total: GenericCounter<AtomicU64>,
    pub acquire_failures_total: GenericCounter<AtomicU64>,
    pub pool_capacity: GenericGauge<AtomicI64>,
    pub pool_available: GenericGauge<AtomicI64>,
}

impl Metrics {
    /// Set up counters and gauges used to produce Prometheus metrics.
    pub fn initialize(metrics_registry: &mut prometheus::Registry) -> Result<Self, prometheus::Error> {
        let query_total = add_int_counter_metric(
            metrics_registry,
            "ledger_query_total",
            "Total queries dispatched to the database.",
        )?;

        let query_failures_total = add_int_counter_metric(
            metrics_registry,
            "ledger_query_failures_total",
            "Total queries whose result carried an error status.",
        )?;

        let acquire_failures_total = add_int_counter_metric(
            metrics_registry,
            "ledger_pool_acquire_failures_total",
            "Total times no connection could be taken from the pool within the retry budget.",
        )?;

        let pool_capacity = add_int_gauge_metric(
            metrics_registry,
            "ledger_pool_capacity",
            "The number of connections the pool maintains.",
        )?;

        let pool_available = add_int_gauge_metric(
            metrics_registry,
            "ledger_pool_available",
            "The number of connections established and not lent out.",
        )?;

        Ok(Metrics {
            query_total,
            query_failures_total,
            acquire_failures_total,
            pool_capacity,
            pool_available,
        })
    }

    pub fn record_pool(&self, capacity: usize, available: usize) {
        self.pool_capacity.set(gauge_value(capacity));
        self.pool_available.set(gauge_value(available));
    }
}

fn gauge_value(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Create a new int counter metric and register it with the provided Prometheus Registry
fn add_int_counter_metric(
    metrics_registry: &mut prometheus::Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<GenericCounter<AtomicU64>, prometheus::Error> {
    let int_counter =
        prometheus::IntCounter::with_opts(prometheus::Opts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(int_counter.clone()))?;
    Ok(int_counter)
}

/// Create a new int gauge metric and register it with the provided Prometheus Registry
fn add_int_gauge_metric(
    metrics_registry: &mut prometheus::Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<GenericGauge<AtomicI64>, prometheus::Error> {
    let int_gauge =
        prometheus::IntGauge::with_opts(prometheus::Opts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(int_gauge.clone()))?;
    Ok(int_gauge)
}
