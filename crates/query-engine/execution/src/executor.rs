//! The seam between compiled plans and the database.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use tracing::{info_span, Instrument};

use orql_configuration::Configuration;
use query_engine_sql::sql;

use crate::error::Error;
use crate::metrics::Metrics;
use crate::query::{fetch_count, fetch_rows};

pub use crate::query::RowMap as Row;

/// Caller-supplied values for the named parameters of a query.
pub type Variables = BTreeMap<String, serde_json::Value>;

/// Runs execution plans and returns flat rows keyed by qualified selection names.
/// See [`crate::hydration`] for turning them into nested entities.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn fetch_many(
        &self,
        plan: &sql::execution_plan::ExecutionPlan,
        variables: &Variables,
    ) -> Result<Vec<Row>, Error>;

    /// The number of rows the plan produces, ignoring paging.
    async fn count(
        &self,
        plan: &sql::execution_plan::ExecutionPlan,
        variables: &Variables,
    ) -> Result<u64, Error>;
}

/// A [`QueryExecutor`] over a sqlx connection pool.
#[derive(Debug, Clone)]
pub struct SqlxExecutor {
    pool: sqlx::AnyPool,
    metrics: Option<Metrics>,
}

impl SqlxExecutor {
    pub fn new(pool: sqlx::AnyPool) -> Self {
        Self {
            pool,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Open a pool using the connection settings of the configuration.
    pub async fn connect(configuration: &Configuration) -> Result<Self, Error> {
        sqlx::any::install_default_drivers();

        let settings = &configuration.pool_settings;
        let pool = AnyPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.pool_timeout))
            .idle_timeout(settings.idle_timeout.map(Duration::from_secs))
            .max_lifetime(settings.connection_lifetime.map(Duration::from_secs))
            .connect(&configuration.connection_uri)
            .await?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &sqlx::AnyPool {
        &self.pool
    }

    async fn run<T, F>(&self, query: &sql::string::SQL, fut: F) -> Result<T, Error>
    where
        F: std::future::Future<Output = Result<T, Error>>,
    {
        tracing::info!(
            generated_sql = %query.sql,
            params = ?query.params,
        );

        let timer = self.metrics.as_ref().map(Metrics::time_execution);
        let result = fut.instrument(info_span!("Execute query")).await;
        if let Some(timer) = timer {
            timer.observe_duration();
        }

        match &result {
            Ok(_) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_successful_query();
                }
            }
            Err(err) => {
                tracing::error!("Database error: {err}");
                if let Some(metrics) = &self.metrics {
                    metrics.record_failed_query();
                }
            }
        }
        result
    }
}

#[async_trait]
impl QueryExecutor for SqlxExecutor {
    async fn fetch_many(
        &self,
        plan: &sql::execution_plan::ExecutionPlan,
        variables: &Variables,
    ) -> Result<Vec<Row>, Error> {
        let sql = plan.query_sql();
        self.run(
            &sql,
            fetch_rows(&self.pool, &sql, variables, &plan.column_types),
        )
        .await
    }

    async fn count(
        &self,
        plan: &sql::execution_plan::ExecutionPlan,
        variables: &Variables,
    ) -> Result<u64, Error> {
        let sql = plan.count_sql();
        self.run(&sql, fetch_count(&self.pool, &sql, variables))
            .await
    }
}
