use orql_configuration::CompilerSettings;
use query_engine_orql::orql;
use query_engine_sql::sql;
use query_engine_translation::translation;

/// Parse and translate a query against the fixture schema.
pub fn translate_with(
    query: &str,
    settings: CompilerSettings,
    options: &translation::query::QueryOptions,
) -> Result<sql::execution_plan::ExecutionPlan, translation::error::Error> {
    let metadata = tests_common::fixtures::metadata();
    let root = orql::parse(query).unwrap();
    let env = translation::helpers::Env::new(&metadata, settings);
    translation::query::translate(&env, &root, options)
}

pub fn translate(
    query: &str,
) -> Result<sql::execution_plan::ExecutionPlan, translation::error::Error> {
    translate_with(
        query,
        CompilerSettings::default(),
        &translation::query::QueryOptions::default(),
    )
}

/// The generated SQL of a query that must translate.
pub fn sql_of(query: &str) -> sql::string::SQL {
    translate(query).unwrap().query_sql()
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}
