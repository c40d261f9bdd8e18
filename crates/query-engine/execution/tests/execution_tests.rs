use std::collections::BTreeMap;

use serde_json::json;

use orql_configuration::CompilerSettings;
use query_engine_execution::error::{Error, QueryError};
use query_engine_execution::hydration::hydrate;
use query_engine_execution::metrics::Metrics;
use query_engine_execution::{QueryExecutor, SqlxExecutor, Variables};
use query_engine_orql::orql;
use query_engine_sql::sql::execution_plan::ExecutionPlan;
use query_engine_translation::translation;

fn plan(query: &str, options: &translation::query::QueryOptions) -> ExecutionPlan {
    let metadata = tests_common::fixtures::metadata();
    let root = orql::parse(query).unwrap();
    let env = translation::helpers::Env::new(&metadata, CompilerSettings::default());
    translation::query::translate(&env, &root, options).unwrap()
}

async fn executor() -> SqlxExecutor {
    SqlxExecutor::new(tests_common::database::seeded_pool().await.unwrap())
}

#[tokio::test]
async fn fetches_a_row_by_parameter() {
    let plan = plan("user(id = $id): {id, firstName}", &Default::default());
    let variables = Variables::from([("id".to_string(), json!(5))]);

    let rows = executor().await.fetch_many(&plan, &variables).await.unwrap();

    similar_asserts::assert_eq!(
        rows,
        vec![json!({"user.id": 5, "user.firstName": "Alex"})
            .as_object()
            .unwrap()
            .clone()]
    );
}

#[tokio::test]
async fn literals_are_bound_not_inlined() {
    let plan = plan(
        r#"user(firstName = "Bob's" && lastName = "O\"Neil"): {id}"#,
        &Default::default(),
    );

    let rows = executor()
        .await
        .fetch_many(&plan, &BTreeMap::new())
        .await
        .unwrap();

    similar_asserts::assert_eq!(
        rows,
        vec![json!({"user.id": 4}).as_object().unwrap().clone()]
    );
}

#[tokio::test]
async fn joins_produce_one_row_per_match() {
    let options = translation::query::QueryOptions {
        order_by: vec![translation::query::OrderByPath {
            path: "user.photos.id".to_string(),
            direction: query_engine_sql::sql::ast::OrderByDirection::Asc,
        }],
        ..Default::default()
    };
    let plan = plan("user(id = 1): {firstName, photos: {url}}", &options);

    let rows = executor()
        .await
        .fetch_many(&plan, &BTreeMap::new())
        .await
        .unwrap();

    let urls: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| row["user_photos.url"].clone())
        .collect();
    similar_asserts::assert_eq!(urls, vec![json!("me.jpg"), json!("me-and-bears.jpg")]);
}

#[tokio::test]
async fn missing_relations_are_null() {
    let plan = plan("user(id = 3): {id, profile: {gender}}", &Default::default());

    let rows = executor()
        .await
        .fetch_many(&plan, &BTreeMap::new())
        .await
        .unwrap();

    assert_eq!(rows[0]["user_profile.gender"], serde_json::Value::Null);
    similar_asserts::assert_eq!(
        hydrate(&plan, &rows),
        vec![json!({"id": 3, "profile": null})]
    );
}

#[tokio::test]
async fn no_match_hydrates_to_nothing() {
    let plan = plan("user(id = 99): {id, photos: {url}}", &Default::default());

    let rows = executor()
        .await
        .fetch_many(&plan, &BTreeMap::new())
        .await
        .unwrap();

    assert!(rows.is_empty());
    assert!(hydrate(&plan, &rows).is_empty());
}

#[tokio::test]
async fn node_without_a_block_selects_every_column() {
    let plan = plan("user(id = $id)", &Default::default());
    let variables = Variables::from([("id".to_string(), json!(5))]);

    let rows = executor().await.fetch_many(&plan, &variables).await.unwrap();

    similar_asserts::assert_eq!(
        hydrate(&plan, &rows),
        vec![json!({
            "id": 5,
            "firstName": "Alex",
            "lastName": "Saw",
            "secret": "axes",
            "isActive": false
        })]
    );
}

#[tokio::test]
async fn booleans_are_decoded_as_booleans() {
    let plan = plan(
        "user(lastName = 'Saw' && isActive = false): {firstName, isActive}",
        &Default::default(),
    );

    let rows = executor()
        .await
        .fetch_many(&plan, &BTreeMap::new())
        .await
        .unwrap();

    similar_asserts::assert_eq!(
        rows,
        vec![json!({"user.firstName": "Alex", "user.isActive": false})
            .as_object()
            .unwrap()
            .clone()]
    );
}

#[tokio::test]
async fn one_to_many_rows_hydrate_into_one_entity() {
    let options = translation::query::QueryOptions {
        order_by: vec![translation::query::OrderByPath {
            path: "user.photos.id".to_string(),
            direction: query_engine_sql::sql::ast::OrderByDirection::Asc,
        }],
        ..Default::default()
    };
    let plan = plan("user(id = 1): {id, firstName, photos: {url}}", &options);

    let rows = executor()
        .await
        .fetch_many(&plan, &BTreeMap::new())
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    similar_asserts::assert_eq!(
        hydrate(&plan, &rows),
        vec![json!({
            "id": 1,
            "firstName": "Timber",
            "photos": [{"url": "me.jpg"}, {"url": "me-and-bears.jpg"}]
        })]
    );
}

#[tokio::test]
async fn many_to_many_goes_through_the_junction() {
    let options = translation::query::QueryOptions {
        order_by: vec![translation::query::OrderByPath {
            path: "question.categories.name".to_string(),
            direction: query_engine_sql::sql::ast::OrderByDirection::Asc,
        }],
        ..Default::default()
    };
    let plan = plan(
        "question(id = $id): {title, categories: {name}}",
        &options,
    );

    let executor = executor().await;
    let with_categories = executor
        .fetch_many(&plan, &Variables::from([("id".to_string(), json!(1))]))
        .await
        .unwrap();
    let without_categories = executor
        .fetch_many(&plan, &Variables::from([("id".to_string(), json!(3))]))
        .await
        .unwrap();

    similar_asserts::assert_eq!(
        hydrate(&plan, &with_categories),
        vec![json!({
            "title": "How to join?",
            "categories": [{"name": "orm"}, {"name": "sql"}]
        })]
    );
    similar_asserts::assert_eq!(
        hydrate(&plan, &without_categories),
        vec![json!({"title": "Unanswered", "categories": []})]
    );
}

#[tokio::test]
async fn count_ignores_paging() {
    let options = translation::query::QueryOptions {
        limit: Some(1),
        offset: Some(1),
        ..Default::default()
    };
    let plan = plan(r#"user(lastName = "Saw"): {id}"#, &options);

    let count = executor()
        .await
        .count(&plan, &BTreeMap::new())
        .await
        .unwrap();

    assert_eq!(count, 2);
}

#[tokio::test]
async fn missing_parameter_is_a_binding_error() {
    let plan = plan("user(id = $id): {id}", &Default::default());

    let result = executor().await.fetch_many(&plan, &BTreeMap::new()).await;

    match result {
        Err(Error::Query(err)) => {
            similar_asserts::assert_eq!(err, QueryError::VariableNotFound("id".to_string()));
        }
        other => panic!("expected a missing variable, got {other:?}"),
    }
}

#[tokio::test]
async fn executions_are_counted() {
    let mut registry = prometheus::Registry::new();
    let metrics = Metrics::initialize(&mut registry).unwrap();
    let executor = executor().await.with_metrics(metrics.clone());

    let all_users = plan("user: {id}", &Default::default());
    let by_id = plan("user(id = $id): {id}", &Default::default());
    executor
        .fetch_many(&all_users, &Variables::new())
        .await
        .unwrap();
    executor
        .fetch_many(&by_id, &Variables::new())
        .await
        .unwrap_err();

    assert_eq!(metrics.query_total.get(), 1);
    assert_eq!(metrics.query_errors_total.get(), 1);
}
