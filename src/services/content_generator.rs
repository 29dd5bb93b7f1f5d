//! Turns rendered prompts into publishable HTML.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::database::entities::ContentFormat;
use crate::errors::{CoreError, CoreResult};
use crate::integrations::{ChatCompletion, ChatError, ChatMessage, ChatRequest};

/// Present in every piece of content produced while the provider was unavailable.
pub const PLACEHOLDER_MARKER: &str = "[[SEO_AGENT_PLACEHOLDER]]";

static MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<\s*/?\s*(p|div|ul|ol|li|h[1-6]|strong|em|b|i|a|br|section|span|table|blockquote)\b")
        .expect("Invalid regex pattern for markup detection")
});

static LEADING_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^<\s*(p|div|ul|ol|h[1-6]|section|table|blockquote|figure|pre|hr)\b")
        .expect("Invalid regex pattern for block detection")
});

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$")
        .expect("Invalid regex pattern for code fence stripping")
});

const SYSTEM_PROMPT: &str =
    "You are an expert SEO copywriter. Follow the output contract exactly and return valid JSON only.";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutlineSection {
    pub heading: String,
    pub body: String,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeoBlock {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub slug: Option<String>,
    pub keywords: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArticleDraft {
    pub title: String,
    pub summary: Option<String>,
    pub outline: Vec<OutlineSection>,
    pub seo: Option<SeoBlock>,
    pub cta: Option<String>,
    pub compliance: Vec<String>,
}

impl ArticleDraft {
    /// Section headings, one per line.
    pub fn outline_text(&self) -> Option<String> {
        let headings: Vec<&str> = self
            .outline
            .iter()
            .map(|section| section.heading.trim())
            .filter(|heading| !heading.is_empty())
            .collect();
        (!headings.is_empty()).then(|| headings.join("\n"))
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if !self.title.trim().is_empty() {
            out.push_str(&format!("<h1>{}</h1>\n", escape_html(self.title.trim())));
        }
        for section in &self.outline {
            out.push_str(&format!("<h2>{}</h2>\n", escape_html(section.heading.trim())));
            out.push_str(&html_block(&section.body));
        }
        if let Some(cta) = self.cta.as_deref().filter(|cta| !cta.trim().is_empty()) {
            out.push_str(&format!("<div class=\"cta\">{}</div>\n", html_block(cta).trim_end()));
        }
        out
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn looks_like_markup(text: &str) -> bool {
    MARKUP.is_match(text)
}

/// Page fields: markup passes through, plain text is escaped and wrapped in a paragraph.
fn page_block(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        String::new()
    } else if looks_like_markup(trimmed) {
        format!("{}\n", trimmed)
    } else {
        format!("<p>{}</p>\n", escape_html(trimmed))
    }
}

/// Article bodies are inline HTML already; only a missing paragraph wrapper
/// is added.
fn html_block(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        String::new()
    } else if LEADING_BLOCK.is_match(trimmed) {
        format!("{}\n", trimmed)
    } else {
        format!("<p>{}</p>\n", trimmed)
    }
}

fn strip_code_fence(raw: &str) -> &str {
    CODE_FENCE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw.trim(), |m| m.as_str())
}

pub fn parse_article_draft(raw: &str) -> CoreResult<ArticleDraft> {
    let draft: ArticleDraft = serde_json::from_str(strip_code_fence(raw)).map_err(|e| {
        CoreError::generation(format!("Model returned malformed JSON: {}", e))
    })?;
    if draft.title.trim().is_empty() && draft.outline.is_empty() {
        return Err(CoreError::generation(
            "Model response has neither a title nor an outline",
        ));
    }
    Ok(draft)
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageSection {
    pub heading: String,
    pub body: String,
    pub bullets: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageCta {
    pub text: String,
    pub button_label: Option<String>,
}

/// Structured landing page returned by a [`PageGenerator`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageSections {
    pub headline: String,
    pub subheadline: Option<String>,
    pub sections: Vec<PageSection>,
    pub cta: Option<PageCta>,
}

impl PageSections {
    pub fn outline_text(&self) -> Option<String> {
        let headings: Vec<&str> = self
            .sections
            .iter()
            .map(|s| s.heading.trim())
            .filter(|h| !h.is_empty())
            .collect();
        (!headings.is_empty()).then(|| headings.join("\n"))
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<section class=\"hero\">\n");
        out.push_str(&format!("<h1>{}</h1>\n", escape_html(self.headline.trim())));
        if let Some(sub) = self.subheadline.as_deref().filter(|s| !s.trim().is_empty()) {
            out.push_str(&page_block(sub));
        }
        out.push_str("</section>\n");

        for section in &self.sections {
            out.push_str("<section>\n");
            out.push_str(&format!("<h2>{}</h2>\n", escape_html(section.heading.trim())));
            out.push_str(&page_block(&section.body));
            if !section.bullets.is_empty() {
                out.push_str("<ul>\n");
                for bullet in &section.bullets {
                    let item = if looks_like_markup(bullet) {
                        bullet.trim().to_string()
                    } else {
                        escape_html(bullet.trim())
                    };
                    out.push_str(&format!("<li>{}</li>\n", item));
                }
                out.push_str("</ul>\n");
            }
            out.push_str("</section>\n");
        }

        if let Some(cta) = self.cta.as_ref().filter(|c| !c.text.trim().is_empty()) {
            out.push_str("<section class=\"cta\">\n");
            out.push_str(&page_block(&cta.text));
            if let Some(label) = cta.button_label.as_deref().filter(|l| !l.trim().is_empty()) {
                out.push_str(&format!(
                    "<a class=\"button\" href=\"#signup\">{}</a>\n",
                    escape_html(label.trim())
                ));
            }
            out.push_str("</section>\n");
        }
        out
    }
}

/// Produces commercial landing pages from a rendered prompt.
#[async_trait]
pub trait PageGenerator: Send + Sync {
    async fn generate_page(&self, prompt: &str) -> CoreResult<PageSections>;
}

const PAGE_CONTRACT: &str = "Instead of the article contract, return a landing page as JSON: \
{\"headline\": \"...\", \"subheadline\": \"...\", \"sections\": [{\"heading\": \"...\", \"body\": \"...\", \"bullets\": [\"...\"]}], \
\"cta\": {\"text\": \"...\", \"buttonLabel\": \"...\"}}";

/// Page generator backed by the chat model.
pub struct ChatPageGenerator {
    chat: Arc<dyn ChatCompletion>,
    model: String,
}

impl ChatPageGenerator {
    pub fn new(chat: Arc<dyn ChatCompletion>, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }
}

#[async_trait]
impl PageGenerator for ChatPageGenerator {
    async fn generate_page(&self, prompt: &str) -> CoreResult<PageSections> {
        let request = ChatRequest::new(
            self.model.clone(),
            vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(prompt),
                ChatMessage::user(PAGE_CONTRACT),
            ],
        )
        .json();
        let raw = self.chat.complete(request).await?;
        let page: PageSections = serde_json::from_str(strip_code_fence(&raw)).map_err(|e| {
            CoreError::generation(format!("Page generator returned malformed JSON: {}", e))
        })?;
        if page.headline.trim().is_empty() && page.sections.is_empty() {
            return Err(CoreError::generation("Page generator returned an empty page"));
        }
        Ok(page)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedContent {
    pub content: String,
    pub outline: Option<String>,
    /// True when the content is placeholder text.
    pub degraded: bool,
}

/// Raw request fields for the unstructured generation path.
#[derive(Clone, Debug, Default)]
pub struct FreeformDraftRequest {
    pub title: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub language: Option<String>,
    pub format: Option<ContentFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct RewriteRequest {
    pub selected_text: String,
    pub context_before: Option<String>,
    pub context_after: Option<String>,
    pub instruction: String,
}

#[derive(Clone)]
pub struct ContentGenerator {
    chat: Arc<dyn ChatCompletion>,
    pages: Arc<dyn PageGenerator>,
    model: String,
    fallback_model: String,
}

impl ContentGenerator {
    pub fn new(
        chat: Arc<dyn ChatCompletion>,
        pages: Arc<dyn PageGenerator>,
        model: impl Into<String>,
        fallback_model: impl Into<String>,
    ) -> Self {
        Self {
            chat,
            pages,
            model: model.into(),
            fallback_model: fallback_model.into(),
        }
    }

    pub fn chat(&self) -> Arc<dyn ChatCompletion> {
        self.chat.clone()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One retry against the fallback model, then the error propagates.
    pub async fn complete_with_fallback(&self, request: ChatRequest) -> Result<String, ChatError> {
        match self.chat.complete(request.clone()).await {
            Ok(text) => Ok(text),
            Err(primary) => {
                warn!(
                    "Model {} failed ({}), retrying with {}",
                    request.model, primary, self.fallback_model
                );
                self.chat
                    .complete(request.with_model(self.fallback_model.clone()))
                    .await
            }
        }
    }

    pub async fn generate(&self, prompt: &str, format: ContentFormat) -> CoreResult<GeneratedContent> {
        match format {
            ContentFormat::CommercialPage => {
                let page = self.pages.generate_page(prompt).await?;
                Ok(GeneratedContent {
                    content: page.to_html(),
                    outline: page.outline_text(),
                    degraded: false,
                })
            }
            ContentFormat::Article => {
                let request = ChatRequest::new(
                    self.model.clone(),
                    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
                )
                .json()
                .with_temperature(0.7);
                let raw = self.complete_with_fallback(request).await?;
                let draft = parse_article_draft(&raw)?;
                info!(
                    "Generated article '{}' with {} sections",
                    draft.title,
                    draft.outline.len()
                );
                Ok(GeneratedContent {
                    content: draft.to_html(),
                    outline: draft.outline_text(),
                    degraded: false,
                })
            }
        }
    }

    /// Unstructured path: Markdown prose, rendered to HTML. Never fails; a
    /// provider outage yields placeholder content carrying [`PLACEHOLDER_MARKER`].
    pub async fn generate_freeform(&self, request: &FreeformDraftRequest) -> GeneratedContent {
        let prompt = freeform_prompt(request);
        let chat_request = ChatRequest::new(
            self.model.clone(),
            vec![
                ChatMessage::system("You are an expert SEO copywriter. Write in Markdown."),
                ChatMessage::user(prompt),
            ],
        )
        .with_temperature(0.7);

        match self.complete_with_fallback(chat_request).await {
            Ok(markdown) => GeneratedContent {
                outline: markdown_headings(&markdown),
                content: markdown_to_html(&markdown),
                degraded: false,
            },
            Err(e) => {
                warn!("Freeform generation failed, returning placeholder: {}", e);
                placeholder_content(&request.title)
            }
        }
    }

    pub async fn rewrite_selection(&self, request: &RewriteRequest) -> CoreResult<String> {
        if request.selected_text.trim().is_empty() {
            return Err(CoreError::validation("Selected text cannot be empty"));
        }
        if request.instruction.trim().is_empty() {
            return Err(CoreError::validation("Rewrite instruction cannot be empty"));
        }

        let mut prompt = String::new();
        if let Some(before) = request.context_before.as_deref().filter(|s| !s.trim().is_empty()) {
            prompt.push_str(&format!("Text before the selection:\n{}\n\n", before.trim()));
        }
        prompt.push_str(&format!("Selected text:\n{}\n\n", request.selected_text.trim()));
        if let Some(after) = request.context_after.as_deref().filter(|s| !s.trim().is_empty()) {
            prompt.push_str(&format!("Text after the selection:\n{}\n\n", after.trim()));
        }
        prompt.push_str(&format!(
            "Instruction: {}\n\nRewrite only the selected text. Keep its language, tone and any inline HTML. \
Return the rewritten text alone, without quotes or commentary.",
            request.instruction.trim()
        ));

        let chat_request = ChatRequest::new(
            self.model.clone(),
            vec![
                ChatMessage::system("You are a careful editor."),
                ChatMessage::user(prompt),
            ],
        )
        .with_temperature(0.5);
        let rewritten = self.complete_with_fallback(chat_request).await?;
        Ok(rewritten.trim().trim_matches('"').trim().to_string())
    }
}

fn freeform_prompt(request: &FreeformDraftRequest) -> String {
    let language = request.language.as_deref().unwrap_or("English");
    let kind = match request.format.unwrap_or(ContentFormat::Article) {
        ContentFormat::Article => "a long-form blog article (1500 to 2500 words)",
        ContentFormat::CommercialPage => "a commercial landing page (800 to 1200 words)",
    };
    let mut prompt = format!(
        "Write {} in {} titled \"{}\".\n",
        kind,
        language,
        request.title.trim()
    );
    if let Some(description) = request.description.as_deref().filter(|d| !d.trim().is_empty()) {
        prompt.push_str(&format!("Brief: {}\n", description.trim()));
    }
    if !request.keywords.is_empty() {
        prompt.push_str(&format!(
            "Work these keywords in naturally: {}\n",
            request.keywords.join(", ")
        ));
    }
    prompt.push_str(
        "Use Markdown headings (##) for sections, short paragraphs and lists where helpful. \
End with a short call to action.",
    );
    prompt
}

pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn markdown_headings(markdown: &str) -> Option<String> {
    let headings: Vec<&str> = markdown
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("## "))
        .map(str::trim)
        .collect();
    (!headings.is_empty()).then(|| headings.join("\n"))
}

pub fn placeholder_content(title: &str) -> GeneratedContent {
    GeneratedContent {
        content: format!(
            "<h1>{}</h1>\n<p>{} Content generation is temporarily unavailable. Regenerate this draft once the provider recovers.</p>\n",
            escape_html(title.trim()),
            PLACEHOLDER_MARKER
        ),
        outline: None,
        degraded: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_to_html() {
        let draft = parse_article_draft(
            r#"```json
{"title": "Leads & lists", "outline": [
  {"heading": "Why", "body": "<p>Because <strong>yes</strong></p>"},
  {"heading": "How", "body": "Plain text"}
], "cta": "Try it today"}
```"#,
        )
        .unwrap();
        assert_eq!(
            draft.to_html(),
            "<h1>Leads &amp; lists</h1>\n<h2>Why</h2>\n<p>Because <strong>yes</strong></p>\n<h2>How</h2>\n<p>Plain text</p>\n<div class=\"cta\"><p>Try it today</p></div>\n"
        );
        assert_eq!(draft.outline_text().as_deref(), Some("Why\nHow"));
    }

    #[test]
    fn test_article_bodies_keep_inline_html() {
        let draft = ArticleDraft {
            title: "Setup".to_string(),
            outline: vec![
                OutlineSection {
                    heading: "Install".to_string(),
                    body: "Run <code>npm i</code> then <u>check</u> R&amp;D <sup>1</sup>.".to_string(),
                    notes: None,
                },
                OutlineSection {
                    heading: "Screens".to_string(),
                    body: "<img src=\"/a.png\" alt=\"A\"> <mark>New</mark>".to_string(),
                    notes: None,
                },
                OutlineSection {
                    heading: "List".to_string(),
                    body: "<ul><li>One</li></ul>".to_string(),
                    notes: None,
                },
            ],
            ..Default::default()
        };
        let html = draft.to_html();
        assert!(html.contains(
            "<p>Run <code>npm i</code> then <u>check</u> R&amp;D <sup>1</sup>.</p>\n"
        ));
        assert!(html.contains("<p><img src=\"/a.png\" alt=\"A\"> <mark>New</mark></p>\n"));
        assert!(html.contains("<h2>List</h2>\n<ul><li>One</li></ul>\n"));
        assert!(!html.contains("&lt;"));
    }

    #[test]
    fn test_malformed_json_is_generation_error() {
        let err = parse_article_draft("not json").unwrap_err();
        assert_eq!(err.code(), "GENERATION_FAILED");
        assert!(parse_article_draft("{}").is_err());
    }

    #[test]
    fn test_page_escapes_plain_text() {
        let page = PageSections {
            headline: "Close <more> deals".to_string(),
            subheadline: Some("<em>Fast</em> setup".to_string()),
            sections: vec![PageSection {
                heading: "Features".to_string(),
                body: "Pipelines & reminders".to_string(),
                bullets: vec!["One".to_string()],
            }],
            cta: Some(PageCta {
                text: "Start free".to_string(),
                button_label: Some("Sign up".to_string()),
            }),
        };
        let html = page.to_html();
        assert!(html.contains("<h1>Close &lt;more&gt; deals</h1>"));
        assert!(html.contains("<em>Fast</em> setup"));
        assert!(html.contains("<p>Pipelines &amp; reminders</p>"));
        assert!(html.contains("<li>One</li>"));
        assert!(html.contains(">Sign up</a>"));
    }

    #[test]
    fn test_markdown_rendering() {
        let html = markdown_to_html("## Intro\n\nSome **bold** text");
        assert!(html.contains("<h2>Intro</h2>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert_eq!(markdown_headings("# T\n## A\ntext\n## B").as_deref(), Some("A\nB"));
    }

    #[test]
    fn test_placeholder_carries_marker() {
        let placeholder = placeholder_content("Title");
        assert!(placeholder.degraded);
        assert!(placeholder.content.contains(PLACEHOLDER_MARKER));
    }
}
