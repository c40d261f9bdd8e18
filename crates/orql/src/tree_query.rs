//! The query builder.

use std::path::Path;
use std::sync::Arc;

use tracing::info_span;

use orql_configuration::environment::Environment;
use orql_configuration::{CompilerSettings, Configuration};
use query_engine_execution::hydration;
use query_engine_execution::metrics::Metrics;
use query_engine_execution::{QueryExecutor, Row, SqlxExecutor, Variables};
use query_engine_metadata::metadata::SchemaProvider;
use query_engine_orql::orql;
use query_engine_sql::sql;
use query_engine_translation::translation;

use crate::error::Error;

/// A tree query with its parameters and paging, ready to be compiled or run.
///
/// The builder is consumed by value so a query can be written as one
/// expression:
///
/// ```ignore
/// let rows = TreeQuery::new(schema, executor)
///     .query("user(lastName = $name): {id, firstName}")
///     .param("name", "Saw")
///     .order_by("user.id", OrderByDirection::Desc)
///     .limit(10)
///     .get_many()
///     .await?;
/// ```
#[derive(Clone)]
pub struct TreeQuery {
    schema: Arc<dyn SchemaProvider>,
    executor: Arc<dyn QueryExecutor>,
    settings: CompilerSettings,
    metrics: Option<Metrics>,
    text: String,
    variables: Variables,
    options: translation::query::QueryOptions,
}

impl TreeQuery {
    pub fn new(schema: Arc<dyn SchemaProvider>, executor: Arc<dyn QueryExecutor>) -> Self {
        TreeQuery {
            schema,
            executor,
            settings: CompilerSettings::default(),
            metrics: None,
            text: String::new(),
            variables: Variables::new(),
            options: translation::query::QueryOptions::default(),
        }
    }

    /// Build a query from a runtime configuration, connecting to its database.
    pub async fn from_configuration(configuration: Configuration) -> Result<Self, Error> {
        let executor = SqlxExecutor::connect(&configuration).await?;
        Ok(TreeQuery::new(Arc::new(configuration.metadata), Arc::new(executor))
            .with_settings(configuration.compiler))
    }

    /// Read the configuration in `configuration_dir`, resolve its secrets and connect.
    pub async fn from_configuration_dir(
        configuration_dir: impl AsRef<Path>,
        environment: impl Environment,
    ) -> Result<Self, Error> {
        let parsed = orql_configuration::parse_configuration(configuration_dir).await?;
        let configuration = orql_configuration::make_runtime_configuration(parsed, environment)?;
        TreeQuery::from_configuration(configuration).await
    }

    #[must_use]
    pub fn with_settings(mut self, settings: CompilerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Record compile times and failures. Execution metrics are set on the executor.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[must_use]
    pub fn query(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Bind a named parameter. Binding the same name again replaces the value.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.variables.extend(
            params
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.options.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.options.offset = Some(offset);
        self
    }

    /// Order by a dotted path such as `user.photos.id`. Calls accumulate.
    #[must_use]
    pub fn order_by(mut self, path: impl Into<String>, direction: sql::ast::OrderByDirection) -> Self {
        self.options.order_by.push(translation::query::OrderByPath {
            path: path.into(),
            direction,
        });
        self
    }

    /// Parse and compile the query.
    pub fn plan(&self) -> Result<sql::execution_plan::ExecutionPlan, Error> {
        let timer = self.metrics.as_ref().map(Metrics::time_plan);
        let result = info_span!("Plan query").in_scope(|| self.compile());
        if let Some(timer) = timer {
            timer.observe_duration();
        }

        if let Err(err) = &result {
            tracing::warn!(kind = ?err.kind(), "{err}");
            if let Some(metrics) = &self.metrics {
                metrics.record_failed_query();
            }
        }
        result
    }

    fn compile(&self) -> Result<sql::execution_plan::ExecutionPlan, Error> {
        let root = orql::parse(&self.text)?;
        let env = translation::helpers::Env::new(self.schema.as_ref(), self.settings.clone());
        let plan = translation::query::translate(&env, &root, &self.options)?;
        tracing::debug!(
            root_entity = %plan.root_entity,
            selection = ?plan.selection,
            joins = plan.joins.len(),
            "compiled tree query"
        );
        Ok(plan)
    }

    /// The SQL of the query and its parameters, without running it.
    pub fn get_sql(&self) -> Result<sql::string::SQL, Error> {
        let sql = self.plan()?.query_sql();
        tracing::info!(generated_sql = %sql.sql, params = ?sql.params);
        tracing::debug!("\n{}", sql.pretty());
        Ok(sql)
    }

    /// The first matching entity, with its relations nested.
    ///
    /// Without a to-many relation the query is limited to one row. Otherwise every
    /// row is fetched so the first entity gets all of its related entities.
    pub async fn get_one(&self) -> Result<Option<serde_json::Value>, Error> {
        let mut plan = self.plan()?;
        if !plan.has_to_many_joins() {
            plan.query.limit.limit = Some(plan.query.limit.limit.map_or(1, |limit| limit.min(1)));
        }
        let rows = self.executor.fetch_many(&plan, &self.variables).await?;
        Ok(hydration::hydrate(&plan, &rows).into_iter().next())
    }

    /// Every matching entity, with its relations nested. Limit and offset apply
    /// to the rows of the joined query.
    pub async fn get_many(&self) -> Result<Vec<serde_json::Value>, Error> {
        let plan = self.plan()?;
        let rows = self.executor.fetch_many(&plan, &self.variables).await?;
        Ok(hydration::hydrate(&plan, &rows))
    }

    /// The flat rows of the joined query, keyed by qualified selection names such
    /// as `user_profile.gender`.
    pub async fn get_raw_many(&self) -> Result<Vec<Row>, Error> {
        let plan = self.plan()?;
        Ok(self.executor.fetch_many(&plan, &self.variables).await?)
    }

    /// The number of rows the query matches. Limit and offset are ignored.
    pub async fn get_count(&self) -> Result<u64, Error> {
        let plan = self.plan()?;
        Ok(self.executor.count(&plan, &self.variables).await?)
    }
}

impl std::fmt::Debug for TreeQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeQuery")
            .field("settings", &self.settings)
            .field("text", &self.text)
            .field("variables", &self.variables)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
