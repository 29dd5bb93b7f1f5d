#![cfg(feature = "graphql")]

mod common;

use async_graphql::{Request, Variables};
use serde_json::{json, Value};

use common::{seed_project, test_app, ScriptedChat, TestApp, OWNER_TOKEN, STRANGER_TOKEN};
use seo_agent::app_context::ImageJobMode;
use seo_agent::graphql::{build_schema, execute_request};

struct Outcome {
    data: Value,
    errors: Vec<async_graphql::ServerError>,
}

async fn run(test: &TestApp, token: Option<&str>, query: &str, variables: Value) -> Outcome {
    let schema = build_schema(test.app.clone());
    let request = Request::new(query).variables(Variables::from_json(variables));
    let response = execute_request(
        &schema,
        &test.app,
        request,
        token.map(|t| format!("Bearer {}", t)),
    )
    .await;
    Outcome {
        data: response.data.into_json().unwrap(),
        errors: response.errors,
    }
}

#[tokio::test]
async fn test_project_hypothesis_and_idea_flow() {
    let test = test_app(ScriptedChat::failing(), ImageJobMode::Disabled).await;

    let created = run(
        &test,
        Some(OWNER_TOKEN),
        r#"mutation($input: CreateProjectInput!) {
            createProject(input: $input) { id ownerId title settingsLanguage }
        }"#,
        json!({"input": {"title": "Acme", "settingsLanguage": "ru"}}),
    )
    .await;
    assert!(created.errors.is_empty(), "{:?}", created.errors);
    let project_id = created.data["createProject"]["id"].as_i64().unwrap();
    assert_eq!(created.data["createProject"]["ownerId"], 1);

    let hypothesis = run(
        &test,
        Some(OWNER_TOKEN),
        r#"mutation($input: CreateHypothesisInput!) {
            createHypothesis(input: $input) { id projectId leanCanvas { problems } icp { persona } }
        }"#,
        json!({"input": {
            "projectId": project_id,
            "title": "Agencies want faster reports",
            "leanCanvas": {"problems": ["Manual work"]},
            "icp": {"persona": "Agency owner"}
        }}),
    )
    .await;
    assert!(hypothesis.errors.is_empty(), "{:?}", hypothesis.errors);
    let hypothesis_id = hypothesis.data["createHypothesis"]["id"].as_i64().unwrap();
    assert_eq!(
        hypothesis.data["createHypothesis"]["leanCanvas"]["problems"],
        json!(["Manual work"])
    );

    let idea = run(
        &test,
        Some(OWNER_TOKEN),
        r#"mutation($input: CreateSeoBacklogIdeaInput!) {
            createSeoBacklogIdea(input: $input) { id status category scheduledDate }
        }"#,
        json!({"input": {
            "projectId": project_id,
            "hypothesisId": hypothesis_id,
            "title": "Reporting in one click",
            "category": "BENEFIT"
        }}),
    )
    .await;
    assert!(idea.errors.is_empty(), "{:?}", idea.errors);
    assert_eq!(idea.data["createSeoBacklogIdea"]["status"], "PENDING");
    assert_eq!(idea.data["createSeoBacklogIdea"]["scheduledDate"], Value::Null);
    let idea_id = idea.data["createSeoBacklogIdea"]["id"].as_i64().unwrap();

    let scheduled = run(
        &test,
        Some(OWNER_TOKEN),
        r#"mutation($id: Int!) {
            scheduleSeoBacklogIdea(id: $id, scheduledDate: "2026-11-02T09:00:00Z") { status scheduledDate }
        }"#,
        json!({"id": idea_id}),
    )
    .await;
    assert!(scheduled.errors.is_empty(), "{:?}", scheduled.errors);
    assert_eq!(scheduled.data["scheduleSeoBacklogIdea"]["status"], "SCHEDULED");

    let sprint = run(
        &test,
        Some(OWNER_TOKEN),
        r#"query($p: Int!, $h: Int!) {
            seoSprint(projectId: $p, hypothesisId: $h) { id status }
            pending: seoBacklogIdeas(projectId: $p, hypothesisId: $h, status: PENDING) { id }
        }"#,
        json!({"p": project_id, "h": hypothesis_id}),
    )
    .await;
    assert!(sprint.errors.is_empty(), "{:?}", sprint.errors);
    assert_eq!(sprint.data["seoSprint"].as_array().unwrap().len(), 1);
    assert!(sprint.data["pending"].as_array().unwrap().is_empty());

    assert!(test.notifier.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_token_is_not_reported() {
    let test = test_app(ScriptedChat::failing(), ImageJobMode::Disabled).await;

    let outcome = run(&test, None, "{ projects { id } }", json!({})).await;

    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].message, "Missing authentication token");
    assert!(outcome.errors[0].extensions.is_none());
    assert!(test.notifier.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_forbidden_errors_are_reported() {
    let test = test_app(ScriptedChat::failing(), ImageJobMode::Disabled).await;
    let (project, hypothesis) = seed_project(&test.db, None, None).await;

    let outcome = run(
        &test,
        Some(STRANGER_TOKEN),
        r#"query($p: Int!, $h: Int!) { seoBacklogIdeas(projectId: $p, hypothesisId: $h) { id } }"#,
        json!({"p": project.id, "h": hypothesis.id}),
    )
    .await;

    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].extensions.is_none());
    let messages = test.notifier.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("FORBIDDEN"));
    assert!(messages[0].contains("seoBacklogIdeas"));
}

#[tokio::test]
async fn test_slot_conflict_surfaces_as_error() {
    let test = test_app(ScriptedChat::failing(), ImageJobMode::Disabled).await;
    let (project, hypothesis) = seed_project(&test.db, None, None).await;
    let create = r#"mutation($input: CreateSeoBacklogIdeaInput!) { createSeoBacklogIdea(input: $input) { id status } }"#;

    let first = run(
        &test,
        Some(OWNER_TOKEN),
        create,
        json!({"input": {
            "projectId": project.id,
            "hypothesisId": hypothesis.id,
            "title": "First",
            "category": "PAIN",
            "scheduledDate": "2026-11-02T08:00:00Z"
        }}),
    )
    .await;
    assert_eq!(first.data["createSeoBacklogIdea"]["status"], "SCHEDULED");

    let second = run(
        &test,
        Some(OWNER_TOKEN),
        create,
        json!({"input": {
            "projectId": project.id,
            "hypothesisId": hypothesis.id,
            "title": "Second",
            "category": "PAIN",
            "scheduledDate": "2026-11-02T17:00:00Z"
        }}),
    )
    .await;
    assert_eq!(second.errors.len(), 1);
    assert!(second.errors[0].message.contains("already taken"));
    assert!(test.notifier.messages.lock().unwrap()[0].contains("CONFLICT"));
}

#[tokio::test]
async fn test_generate_backlog_ideas() {
    let chat = ScriptedChat::replying(
        json!({"ideas": [
            {"title": "Why reports run late", "description": "Root causes", "category": "pain"},
            {"title": "", "category": "goal"},
            {"title": "Dashboards vs spreadsheets", "category": "comparison"},
            {"title": "Automate the monthly report", "category": "feature"}
        ]})
        .to_string(),
    );
    let test = test_app(chat, ImageJobMode::Disabled).await;
    let (project, hypothesis) = seed_project(&test.db, None, None).await;

    let outcome = run(
        &test,
        Some(OWNER_TOKEN),
        r#"mutation($p: Int!, $h: Int!) {
            generateBacklogIdeas(projectId: $p, hypothesisId: $h, count: 4) { title category status }
        }"#,
        json!({"p": project.id, "h": hypothesis.id}),
    )
    .await;

    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    let ideas = outcome.data["generateBacklogIdeas"].as_array().unwrap();
    let titles: Vec<&str> = ideas.iter().map(|i| i["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Why reports run late", "Automate the monthly report"]);
    assert!(ideas.iter().all(|i| i["status"] == "PENDING"));
}
