mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use common::{
    article_json, immediate_images, owner, seed_project, stranger, test_app, test_app_with_images,
    FakeImageProvider, ScriptedChat, TestApp,
};
use seo_agent::app_context::ImageJobMode;
use seo_agent::database::entities::{
    seo_backlog_ideas, seo_content_items, BacklogCategory, BacklogStatus, ClusterIntent,
    ContentFormat, ContentStatus, ImageStatus,
};
use seo_agent::errors::CoreErrorKind;
use seo_agent::services::content_generator::{
    FreeformDraftRequest, RewriteRequest, PLACEHOLDER_MARKER,
};
use seo_agent::services::image_generator::ImageVariant;
use seo_agent::services::{NewBacklogIdea, NewCluster};

async fn seeded_idea(test: &TestApp, settings_language: Option<&str>, language: Option<&str>) -> seo_backlog_ideas::Model {
    let (project, hypothesis) = seed_project(&test.db, settings_language, language).await;
    test.app
        .backlog_service()
        .create(
            &owner(),
            NewBacklogIdea {
                project_id: project.id,
                hypothesis_id: hypothesis.id,
                title: "How to automate client reports".to_string(),
                description: Some("Agencies spend days on reporting".to_string()),
                category: BacklogCategory::Pain,
                cluster_id: None,
                scheduled_date: None,
            },
        )
        .await
        .unwrap()
}

async fn generate(test: &TestApp, idea: &seo_backlog_ideas::Model) -> seo_agent::errors::CoreResult<seo_content_items::Model> {
    test.app
        .content_service()
        .generate_for_backlog_idea(&owner(), idea.id, idea.project_id, idea.hypothesis_id, None)
        .await
}

#[tokio::test]
async fn test_generating_twice_overwrites_the_same_item() {
    let chat = ScriptedChat::failing();
    chat.push_ok(article_json("How to automate client reports", "First version."));
    chat.push_ok(article_json("How to automate client reports", "Second version."));
    let test = test_app(chat, ImageJobMode::Disabled).await;
    let idea = seeded_idea(&test, None, None).await;

    let first = generate(&test, &idea).await.unwrap();
    assert!(first.content.contains("First version."));
    assert_eq!(first.status().unwrap(), ContentStatus::Draft);
    assert_eq!(first.backlog_idea_id, Some(idea.id));
    assert_eq!(first.title, idea.title);
    assert_eq!(first.format().unwrap(), ContentFormat::Article);

    let second = generate(&test, &idea).await.unwrap();
    assert_eq!(second.id, first.id);
    assert!(second.content.contains("Second version."));
    assert!(!second.content.contains("First version."));
    assert_eq!(second.status().unwrap(), ContentStatus::Draft);

    let linked = seo_content_items::Entity::find()
        .filter(seo_content_items::Column::BacklogIdeaId.eq(idea.id))
        .count(&test.db)
        .await
        .unwrap();
    assert_eq!(linked, 1);

    // Generation does not move the idea
    let idea = test.app.backlog_service().get(&owner(), idea.id).await.unwrap();
    assert_eq!(idea.status().unwrap(), BacklogStatus::Pending);
}

#[tokio::test]
async fn test_provider_failure_leaves_state_unchanged() {
    let chat = ScriptedChat::failing();
    chat.push_ok(article_json("How to automate client reports", "Kept body."));
    let test = test_app(chat, ImageJobMode::Disabled).await;
    let idea = seeded_idea(&test, None, None).await;

    let first = generate(&test, &idea).await.unwrap();

    let err = generate(&test, &idea).await.unwrap_err();
    assert_ne!(err.kind(), CoreErrorKind::Forbidden);
    assert_ne!(err.kind(), CoreErrorKind::NotFound);

    let stored = test
        .app
        .content_service()
        .get(&owner(), first.id)
        .await
        .unwrap();
    assert_eq!(stored.content, first.content);
    assert_eq!(stored.updated_at, first.updated_at);
}

#[tokio::test]
async fn test_malformed_reply_is_a_generation_error() {
    let test = test_app(ScriptedChat::replying("not json at all"), ImageJobMode::Disabled).await;
    let idea = seeded_idea(&test, None, None).await;

    let err = generate(&test, &idea).await.unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Generation);
    assert_eq!(
        seo_content_items::Entity::find().count(&test.db).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_settings_language_wins_over_project_language() {
    let test = test_app(
        ScriptedChat::replying(article_json("Отчеты", "Текст.")),
        ImageJobMode::Disabled,
    )
    .await;
    let idea = seeded_idea(&test, Some("ru"), Some("English")).await;

    generate(&test, &idea).await.unwrap();

    let prompts = test.chat.prompts();
    assert!(prompts.iter().any(|p| p.contains("Russian")));
}

#[tokio::test]
async fn test_other_users_cannot_generate() {
    let test = test_app(
        ScriptedChat::replying(article_json("T", "B")),
        ImageJobMode::Disabled,
    )
    .await;
    let idea = seeded_idea(&test, None, None).await;

    let err = test
        .app
        .content_service()
        .generate_for_backlog_idea(&stranger(), idea.id, idea.project_id, idea.hypothesis_id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Forbidden);
    assert!(test.chat.requests().is_empty());
}

#[tokio::test]
async fn test_hero_image_is_stored_after_generation() {
    let test = test_app(
        ScriptedChat::replying(article_json("How to automate client reports", "Body.")),
        immediate_images(),
    )
    .await;
    let idea = seeded_idea(&test, None, None).await;

    let item = generate(&test, &idea).await.unwrap();

    assert_eq!(item.image_status().unwrap(), ImageStatus::Ready);
    let url = item.image_url.clone().unwrap();
    assert!(url.starts_with("https://cdn.test/media/"));
    assert_eq!(test.storage.objects.lock().unwrap().len(), 1);
    assert_eq!(test.images.calls.lock().unwrap().len(), 1);

    let cleared = test
        .app
        .content_service()
        .delete_image(&owner(), item.id)
        .await
        .unwrap();
    assert!(cleared.image_url.is_none());
    assert_eq!(cleared.image_status().unwrap(), ImageStatus::NoImage);
    assert!(test.storage.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_image_is_recorded_on_the_item() {
    let test = test_app_with_images(
        ScriptedChat::replying(article_json("How to automate client reports", "Body.")),
        FakeImageProvider {
            fail: true,
            ..Default::default()
        },
        immediate_images(),
    )
    .await;
    let idea = seeded_idea(&test, None, None).await;

    let item = generate(&test, &idea).await.unwrap();

    assert_eq!(item.image_status().unwrap(), ImageStatus::Failed);
    assert!(item.image_error.is_some());
    assert!(item.image_url.is_none());
    // Retried up to the configured attempts
    assert_eq!(test.images.calls.lock().unwrap().len(), 2);
    assert!(item.content.contains("Body."));
}

#[tokio::test]
async fn test_freeform_draft_degrades_to_placeholder() {
    let test = test_app(ScriptedChat::failing(), ImageJobMode::Disabled).await;

    let draft = test
        .app
        .content_service()
        .generate_draft(FreeformDraftRequest {
            title: "Reporting checklist".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(draft.degraded);
    assert!(draft.content.contains(PLACEHOLDER_MARKER));
    assert!(draft.content.contains("Reporting checklist"));
}

#[tokio::test]
async fn test_freeform_draft_renders_markdown() {
    let test = test_app(
        ScriptedChat::replying("## Intro\n\nReports, *faster*.\n\n## Steps\n\n- Connect data"),
        ImageJobMode::Disabled,
    )
    .await;

    let draft = test
        .app
        .content_service()
        .generate_draft(FreeformDraftRequest {
            title: "Reporting checklist".to_string(),
            keywords: vec!["client reporting".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(!draft.degraded);
    assert!(draft.content.contains("<h2>Intro</h2>"));
    assert!(draft.content.contains("<em>faster</em>"));
    assert_eq!(draft.outline.as_deref(), Some("Intro\nSteps"));
    assert!(test.chat.prompts().iter().any(|p| p.contains("client reporting")));
}

#[tokio::test]
async fn test_rewrite_reports_failure_without_error() {
    let chat = ScriptedChat::failing();
    chat.push_ok(article_json("How to automate client reports", "Body."));
    let test = test_app(chat, ImageJobMode::Disabled).await;
    let idea = seeded_idea(&test, None, None).await;
    let item = generate(&test, &idea).await.unwrap();

    let outcome = test
        .app
        .content_service()
        .rewrite_selection(
            &owner(),
            item.id,
            RewriteRequest {
                selected_text: "Body.".to_string(),
                instruction: "Make it punchier".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!outcome.success);
    assert!(outcome.rewritten_text.is_none());
    assert!(outcome.error.is_some());

    test.chat.push_ok("\"A sharper body.\"");
    let outcome = test
        .app
        .content_service()
        .rewrite_selection(
            &owner(),
            item.id,
            RewriteRequest {
                selected_text: "Body.".to_string(),
                instruction: "Make it punchier".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.rewritten_text.as_deref(), Some("A sharper body."));

    let forbidden = test
        .app
        .content_service()
        .rewrite_selection(&stranger(), item.id, RewriteRequest::default())
        .await
        .unwrap_err();
    assert_eq!(forbidden.kind(), CoreErrorKind::Forbidden);
}

#[tokio::test]
async fn test_approve_moves_draft_to_ready() {
    let test = test_app(
        ScriptedChat::replying(article_json("How to automate client reports", "Body.")),
        ImageJobMode::Disabled,
    )
    .await;
    let idea = seeded_idea(&test, None, None).await;
    let item = generate(&test, &idea).await.unwrap();

    let approved = test
        .app
        .content_service()
        .approve(&owner(), item.id, None)
        .await
        .unwrap();
    assert_eq!(approved.status().unwrap(), ContentStatus::Ready);
    assert_eq!(approved.reviewer_id, Some(common::OWNER_ID));
}

#[tokio::test]
async fn test_generated_ideas_skip_oversized_descriptions_and_link_clusters() {
    let chat = ScriptedChat::replying(
        serde_json::json!({"ideas": [
            {"title": "Отчеты за пять минут", "description": "Коротко", "category": "benefit", "clusterTitle": "кластер отчетов"},
            {"title": "Too much to say", "description": "x".repeat(10_001), "category": "pain"},
            {"title": "Weekly digest", "category": "feature", "clusterTitle": "Unknown"}
        ]})
        .to_string(),
    );
    let test = test_app(chat, ImageJobMode::Disabled).await;
    let (project, hypothesis) = seed_project(&test.db, None, None).await;
    let cluster = test
        .app
        .cluster_service()
        .create(
            &owner(),
            NewCluster {
                project_id: project.id,
                hypothesis_id: hypothesis.id,
                title: "Кластер Отчетов".to_string(),
                intent: ClusterIntent::Informational,
                keywords: vec!["отчеты".to_string()],
            },
        )
        .await
        .unwrap();

    let ideas = test
        .app
        .idea_generator()
        .generate(&owner(), project.id, hypothesis.id, 3)
        .await
        .unwrap();

    let titles: Vec<&str> = ideas.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Отчеты за пять минут", "Weekly digest"]);
    assert_eq!(ideas[0].cluster_id, Some(cluster.id));
    assert_eq!(ideas[1].cluster_id, None);
    assert_eq!(
        seo_backlog_ideas::Entity::find().count(&test.db).await.unwrap(),
        2
    );
}

#[tokio::test]
async fn test_blank_scene_falls_back_to_title() {
    let chat = ScriptedChat::failing();
    chat.push_ok(article_json("How to automate client reports", "Body."));
    chat.push_ok("   \n ");
    let test = test_app(chat, ImageJobMode::Disabled).await;
    let idea = seeded_idea(&test, None, None).await;
    let item = generate(&test, &idea).await.unwrap();

    let updated = test
        .app
        .content_service()
        .generate_image(
            &owner(),
            item.id,
            "Reporting dashboards",
            Some("Weekly agency reviews"),
            ImageVariant::Hero,
        )
        .await
        .unwrap();

    assert_eq!(updated.image_status().unwrap(), ImageStatus::Ready);
    let calls = test.images.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0]
        .text
        .contains("Scene: Reporting dashboards. Weekly agency reviews Style:"));
}
