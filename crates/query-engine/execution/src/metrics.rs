//! Metrics setup and update for query execution.

use prometheus::{Histogram, HistogramOpts, IntCounter, Opts, Registry};

#[derive(Debug, Clone)]
pub struct Metrics {
    pub query_total: IntCounter,
    pub query_errors_total: IntCounter,
    pub plan_time: Histogram,
    pub execution_time: Histogram,
}

impl Metrics {
    /// Setup counters and histograms used to produce Prometheus metrics
    pub fn initialize(metrics_registry: &mut Registry) -> Result<Self, prometheus::Error> {
        let query_total = add_int_counter_metric(
            metrics_registry,
            "orql_query_total",
            "Total successful queries.",
        )?;

        let query_errors_total = add_int_counter_metric(
            metrics_registry,
            "orql_query_errors_total",
            "Total queries that failed to compile or execute.",
        )?;

        let plan_time = add_histogram_metric(
            metrics_registry,
            "orql_plan_time",
            "Time taken to parse and compile a query, in seconds.",
        )?;

        let execution_time = add_histogram_metric(
            metrics_registry,
            "orql_execution_time",
            "Time taken to execute a compiled query, in seconds.",
        )?;

        Ok(Self {
            query_total,
            query_errors_total,
            plan_time,
            execution_time,
        })
    }

    pub fn record_successful_query(&self) {
        self.query_total.inc();
    }

    pub fn record_failed_query(&self) {
        self.query_errors_total.inc();
    }

    pub fn time_plan(&self) -> prometheus::HistogramTimer {
        self.plan_time.start_timer()
    }

    pub fn time_execution(&self) -> prometheus::HistogramTimer {
        self.execution_time.start_timer()
    }
}

/// Create a new int counter metric and register it with the provided Prometheus Registry
fn add_int_counter_metric(
    metrics_registry: &mut Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<IntCounter, prometheus::Error> {
    let int_counter = IntCounter::with_opts(Opts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(int_counter.clone()))?;
    Ok(int_counter)
}

/// Create a new histogram metric and register it with the provided Prometheus Registry
fn add_histogram_metric(
    metrics_registry: &mut Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<Histogram, prometheus::Error> {
    let histogram = Histogram::with_opts(HistogramOpts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(histogram.clone()))?;
    Ok(histogram)
}
