mod common;

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{basic_auth, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{owner, seed_project, stranger, test_app, ScriptedChat, TestApp};
use seo_agent::app_context::ImageJobMode;
use seo_agent::database::entities::{
    seo_backlog_ideas, seo_content_items, BacklogCategory, BacklogStatus, ContentFormat,
    ContentStatus,
};
use seo_agent::errors::CoreErrorKind;
use seo_agent::integrations::WordPressCredentials;
use seo_agent::services::{
    ContentItemInput, NewBacklogIdea, PublishRequest, SprintSettingsInput,
};

struct Fixture {
    test: TestApp,
    idea: seo_backlog_ideas::Model,
    item: seo_content_items::Model,
}

async fn fixture(status: ContentStatus, wordpress_url: Option<String>) -> Fixture {
    let test = test_app(ScriptedChat::failing(), ImageJobMode::Disabled).await;
    let (project, hypothesis) = seed_project(&test.db, None, None).await;

    let idea = test
        .app
        .backlog_service()
        .create(
            &owner(),
            NewBacklogIdea {
                project_id: project.id,
                hypothesis_id: hypothesis.id,
                title: "Reporting for agencies".to_string(),
                description: None,
                category: BacklogCategory::Benefit,
                cluster_id: None,
                scheduled_date: Some(Utc.with_ymd_and_hms(2030, 3, 4, 9, 0, 0).unwrap()),
            },
        )
        .await
        .unwrap();

    let item = test
        .app
        .content_service()
        .upsert(
            &owner(),
            ContentItemInput {
                id: None,
                project_id: project.id,
                hypothesis_id: hypothesis.id,
                backlog_idea_id: Some(idea.id),
                title: "Reporting for agencies".to_string(),
                category: "benefit".to_string(),
                format: ContentFormat::Article,
                outline: None,
                content: "<p>Reports in one click.</p>".to_string(),
                image_url: None,
                status: Some(status),
                owner_id: None,
                reviewer_id: None,
            },
        )
        .await
        .unwrap();

    if let Some(base_url) = wordpress_url {
        test.app
            .sprint_settings_service()
            .upsert(
                &owner(),
                SprintSettingsInput {
                    project_id: project.id,
                    hypothesis_id: hypothesis.id,
                    weekly_cadence: 2,
                    wordpress_base_url: Some(base_url),
                    wordpress_username: Some("editor".to_string()),
                    wordpress_app_password: Some("abcd efgh".to_string()),
                    wordpress_default_category_id: Some(Some(7)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    Fixture { test, idea, item }
}

fn request(fixture: &Fixture) -> PublishRequest {
    PublishRequest {
        content_item_id: fixture.item.id,
        project_id: fixture.item.project_id,
        hypothesis_id: Some(fixture.item.hypothesis_id),
        status: None,
    }
}

#[tokio::test]
async fn test_confirmed_publish_updates_item_and_idea() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(basic_auth("editor", "abcd efgh"))
        .and(body_partial_json(json!({
            "title": "Reporting for agencies",
            "status": "future",
            "date_gmt": "2030-03-04T09:00:00",
            "categories": [7]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42,
            "link": "https://blog.test/?p=42"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fixture = fixture(ContentStatus::Ready, Some(server.uri())).await;
    let outcome = fixture
        .test
        .app
        .publish_service()
        .publish(&owner(), request(&fixture))
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.wordpress_post_id, Some(42));
    assert_eq!(outcome.wordpress_post_url.as_deref(), Some("https://blog.test/?p=42"));

    let item = fixture
        .test
        .app
        .content_service()
        .get(&owner(), fixture.item.id)
        .await
        .unwrap();
    assert_eq!(item.status().unwrap(), ContentStatus::Published);
    assert_eq!(item.wordpress_post_id, Some(42));

    let idea = fixture
        .test
        .app
        .backlog_service()
        .get(&owner(), fixture.idea.id)
        .await
        .unwrap();
    assert_eq!(idea.status().unwrap(), BacklogStatus::InProgress);
    assert_eq!(idea.scheduled_date, fixture.idea.scheduled_date);
}

#[tokio::test]
async fn test_republish_updates_existing_post() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42,
            "link": "https://blog.test/?p=42"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/posts/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "link": "https://blog.test/reporting-for-agencies/"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fixture = fixture(ContentStatus::Ready, Some(server.uri())).await;
    let service = fixture.test.app.publish_service();
    service.publish(&owner(), request(&fixture)).await.unwrap();
    let outcome = service.publish(&owner(), request(&fixture)).await.unwrap();

    assert!(outcome.success);
    assert_eq!(
        outcome.wordpress_post_url.as_deref(),
        Some("https://blog.test/reporting-for-agencies/")
    );
    // Already in progress; a second publish leaves the idea alone
    let idea = fixture
        .test
        .app
        .backlog_service()
        .get(&owner(), fixture.idea.id)
        .await
        .unwrap();
    assert_eq!(idea.status().unwrap(), BacklogStatus::InProgress);
}

#[tokio::test]
async fn test_unconfirmed_response_changes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let fixture = fixture(ContentStatus::Ready, Some(server.uri())).await;
    let outcome = fixture
        .test
        .app
        .publish_service()
        .publish(&owner(), request(&fixture))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert!(outcome.error.is_some());
    assert!(outcome.wordpress_post_id.is_none());

    let item = fixture
        .test
        .app
        .content_service()
        .get(&owner(), fixture.item.id)
        .await
        .unwrap();
    assert_eq!(item.status().unwrap(), ContentStatus::Ready);
    assert!(item.wordpress_post_id.is_none());

    let idea = fixture
        .test
        .app
        .backlog_service()
        .get(&owner(), fixture.idea.id)
        .await
        .unwrap();
    assert_eq!(idea.status().unwrap(), BacklogStatus::Scheduled);
}

#[tokio::test]
async fn test_remote_rejection_is_a_failed_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "rest_cannot_create",
            "message": "Sorry, you are not allowed to create posts as this user."
        })))
        .mount(&server)
        .await;

    let fixture = fixture(ContentStatus::Ready, Some(server.uri())).await;
    let outcome = fixture
        .test
        .app
        .publish_service()
        .publish(&owner(), request(&fixture))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("not allowed"));
}

#[tokio::test]
async fn test_draft_items_are_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let fixture = fixture(ContentStatus::Draft, Some(server.uri())).await;
    let outcome = fixture
        .test
        .app
        .publish_service()
        .publish(&owner(), request(&fixture))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("approved"));
}

#[tokio::test]
async fn test_missing_settings_and_ownership() {
    let fixture = fixture(ContentStatus::Ready, None).await;
    let service = fixture.test.app.publish_service();

    let outcome = service.publish(&owner(), request(&fixture)).await.unwrap();
    assert!(!outcome.success);
    assert!(outcome.error.is_some());

    let err = service
        .publish(&stranger(), request(&fixture))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Forbidden);

    let mut unknown = request(&fixture);
    unknown.content_item_id = 9_999;
    let err = service.publish(&owner(), unknown).await.unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::NotFound);

    let mut bad_status = request(&fixture);
    bad_status.status = Some("trash".to_string());
    let err = service.publish(&owner(), bad_status).await.unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Validation);
}

#[tokio::test]
async fn test_connection_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/users/me"))
        .and(query_param("context", "edit"))
        .and(basic_auth("editor", "good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Site Editor"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "incorrect_password",
            "message": "The provided password is an invalid application password."
        })))
        .mount(&server)
        .await;

    let test = test_app(ScriptedChat::failing(), ImageJobMode::Disabled).await;
    let service = test.app.publish_service();

    let ok = service
        .test_connection(WordPressCredentials {
            base_url: format!("{}/", server.uri()),
            username: "editor".to_string(),
            app_password: "good".to_string(),
        })
        .await;
    assert!(ok.success);
    assert!(ok.message.unwrap().contains("Site Editor"));

    let rejected = service
        .test_connection(WordPressCredentials {
            base_url: server.uri(),
            username: "editor".to_string(),
            app_password: "bad".to_string(),
        })
        .await;
    assert!(!rejected.success);
    assert!(rejected.error.unwrap().contains("invalid application password"));

    let malformed = service
        .test_connection(WordPressCredentials {
            base_url: "ftp://blog.test".to_string(),
            username: "editor".to_string(),
            app_password: "good".to_string(),
        })
        .await;
    assert!(!malformed.success);
}
