//! Archetype classification and generation prompt rendering.
//!
//! Everything here is pure: the same snapshot and idea always render the
//! same prompt text.

use handlebars::Handlebars;
use serde_json::json;

use crate::common::get_handlebars;
use crate::database::entities::{BacklogCategory, ContentFormat};
use crate::errors::{CoreError, CoreResult};
use crate::services::context_loader::ContextSnapshot;

const GENERATION_TEMPLATE: &str = "generation";

const GENERATION_PROMPT: &str = r#"You are a senior content strategist writing for {{project.title}}.
Write a {{format_label}} in {{language}}. Use {{language}} throughout: headings, body, SEO fields and the call to action.

# Topic
Title: {{idea.title}}
{{#if idea.description}}Brief: {{idea.description}}
{{/if}}{{#if idea.category}}Category: {{idea.category}}
{{/if}}Archetype: {{archetype.name}}

# Product context
Hypothesis: {{hypothesis.title}}
{{#if hypothesis.description}}{{hypothesis.description}}
{{/if}}{{#if (nonempty canvas.problems)}}Problems solved: {{join canvas.problems "; "}}
{{/if}}{{#if (nonempty canvas.solutions)}}Solutions: {{join canvas.solutions "; "}}
{{/if}}{{#if canvas.uvp}}Unique value proposition: {{canvas.uvp}}
{{/if}}{{#if (nonempty canvas.segments)}}Customer segments: {{join canvas.segments "; "}}
{{/if}}
# Audience
{{#if icp.persona}}Persona: {{icp.persona}}
{{/if}}{{#if (nonempty icp.pains)}}Pains: {{join icp.pains "; "}}
{{/if}}{{#if (nonempty icp.goals)}}Goals: {{join icp.goals "; "}}
{{/if}}{{#if (nonempty icp.triggers)}}Triggers: {{join icp.triggers "; "}}
{{/if}}{{#if (nonempty clusters)}}
# Keyword clusters
{{#each clusters as |cluster|}}- {{cluster.title}} ({{cluster.intent}}): {{join cluster.keywords ", "}}
{{/each}}{{/if}}
# Requirements
- Length: {{words.min}} to {{words.max}} words.
- Balance: {{archetype.topic_share}}% exploration of the topic itself, {{archetype.product_share}}% product mention. Never turn the piece into an advert.
- {{archetype.guidance}}
- Refer to the product by rotating through these names and never use the same one twice in the document: {{join synonyms ", "}}.
- Outline bodies may contain inline HTML (<p>, <ul>, <li>, <strong>, <em>, <a>) and nothing else.
{{#if extra}}- Additional instructions: {{extra}}
{{/if}}
# Output
Respond with a single JSON object and no surrounding text:
{
  "title": "final headline",
  "summary": "two sentence summary",
  "outline": [
    {"heading": "section heading", "body": "section body as inline HTML", "notes": "optional editor notes"}
  ],
  "seo": {"metaTitle": "...", "metaDescription": "...", "slug": "...", "keywords": ["..."]},
  "cta": "optional closing call to action",
  "compliance": ["claims the editor must verify before publishing"]
}
"#;

const IDEAS_TEMPLATE: &str = "ideas";

const IDEAS_PROMPT: &str = r#"Suggest {{count}} SEO content ideas in {{language}} for {{brand}} ({{hypothesis.title}}).
{{#if icp.persona}}Audience: {{icp.persona}}
{{/if}}{{#if (nonempty icp.pains)}}Pains: {{join icp.pains "; "}}
{{/if}}{{#if (nonempty icp.goals)}}Goals: {{join icp.goals "; "}}
{{/if}}{{#if (nonempty icp.triggers)}}Triggers: {{join icp.triggers "; "}}
{{/if}}{{#if (nonempty canvas.problems)}}Problems: {{join canvas.problems "; "}}
{{/if}}{{#if (nonempty clusters)}}Keyword clusters:
{{#each clusters as |cluster|}}- {{cluster.title}} ({{cluster.intent}}): {{join cluster.keywords ", "}}
{{/each}}{{/if}}Each idea needs a category from: {{join categories ", "}}. When an idea belongs to a keyword cluster, give its exact title as clusterTitle.
Respond with JSON only: {"ideas": [{"title": "...", "description": "...", "category": "...", "clusterTitle": "..."}]}
"#;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContentArchetype {
    Trigger,
    PainPoint,
    Feature,
    Onboarding,
    Tutorial,
    Solution,
    Benefit,
    Faq,
    General,
}

impl ContentArchetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentArchetype::Trigger => "trigger",
            ContentArchetype::PainPoint => "pain_point",
            ContentArchetype::Feature => "feature",
            ContentArchetype::Onboarding => "onboarding",
            ContentArchetype::Tutorial => "tutorial",
            ContentArchetype::Solution => "solution",
            ContentArchetype::Benefit => "benefit",
            ContentArchetype::Faq => "faq",
            ContentArchetype::General => "general",
        }
    }

    /// (topic share, product share) in percent.
    pub fn content_ratio(&self) -> (u8, u8) {
        match self {
            ContentArchetype::Faq => (95, 5),
            ContentArchetype::PainPoint
            | ContentArchetype::Feature
            | ContentArchetype::Solution
            | ContentArchetype::Benefit => (85, 15),
            ContentArchetype::Trigger
            | ContentArchetype::Tutorial
            | ContentArchetype::Onboarding
            | ContentArchetype::General => (90, 10),
        }
    }

    fn guidance(&self) -> &'static str {
        match self {
            ContentArchetype::Trigger => {
                "Open with the moment that makes the reader start looking for help, then explore options neutrally."
            }
            ContentArchetype::PainPoint => {
                "Name the pain precisely, show its cost, and walk through ways to relieve it before mentioning the product."
            }
            ContentArchetype::Feature => {
                "Explain the underlying job to be done first; introduce the feature as one way to get it done."
            }
            ContentArchetype::Onboarding => {
                "Guide a newcomer through the first steps in order, with checkpoints they can verify."
            }
            ContentArchetype::Tutorial => {
                "Teach with numbered steps and concrete examples the reader can follow without the product."
            }
            ContentArchetype::Solution => {
                "Compare approaches to the problem honestly, including their trade-offs."
            }
            ContentArchetype::Benefit => {
                "Show the outcome the reader gains with evidence and realistic expectations."
            }
            ContentArchetype::Faq => {
                "Use each question as a heading and answer it directly in the first sentence."
            }
            ContentArchetype::General => {
                "Cover the topic in depth with practical, specific advice."
            }
        }
    }

    fn word_count(&self, format: ContentFormat) -> (u32, u32) {
        match (format, self) {
            (ContentFormat::CommercialPage, _) => (800, 1200),
            (_, ContentArchetype::Faq) => (1200, 1800),
            (_, ContentArchetype::Tutorial | ContentArchetype::Onboarding) => (2000, 3000),
            _ => (1500, 2500),
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Title signals win over the stored category, except for FAQ which either can set.
pub fn classify(category: Option<BacklogCategory>, title: &str) -> ContentArchetype {
    let title = title.to_lowercase();

    if category == Some(BacklogCategory::Faq)
        || contains_any(&title, &["faq", "frequently asked", "questions"])
    {
        return ContentArchetype::Faq;
    }
    if contains_any(&title, &["how to", "guide", "tutorial", "step by step", "step-by-step"]) {
        return ContentArchetype::Tutorial;
    }
    if contains_any(&title, &["getting started", "onboarding", "setup", "set up", "first steps"]) {
        return ContentArchetype::Onboarding;
    }

    match category {
        Some(BacklogCategory::Trigger) => return ContentArchetype::Trigger,
        Some(BacklogCategory::Pain) => return ContentArchetype::PainPoint,
        Some(BacklogCategory::Feature) => return ContentArchetype::Feature,
        Some(BacklogCategory::Benefit) => return ContentArchetype::Benefit,
        Some(BacklogCategory::Goal) => return ContentArchetype::Solution,
        _ => {}
    }

    if contains_any(&title, &["solution", "solve", "fix "]) {
        return ContentArchetype::Solution;
    }
    ContentArchetype::General
}

/// The first run of capitalised words in the project title.
pub fn brand_name(project_title: &str) -> Option<String> {
    let mut run: Vec<&str> = Vec::new();
    for word in project_title.split_whitespace() {
        let cleaned = word.trim_matches(|c: char| !c.is_alphanumeric());
        let capitalised = cleaned.chars().next().map_or(false, char::is_uppercase);
        if capitalised {
            run.push(cleaned);
        } else if !run.is_empty() {
            break;
        }
    }
    (!run.is_empty()).then(|| run.join(" "))
}

/// Names to rotate through so the product is never named the same way twice.
pub fn product_synonyms(project_title: &str) -> Vec<String> {
    let title = project_title.trim();
    let mut candidates: Vec<String> = Vec::new();
    if let Some(brand) = brand_name(title) {
        candidates.push(brand);
    }
    if !title.is_empty() {
        candidates.push(title.to_string());
    }
    candidates.extend(
        ["the platform", "the service", "the tool", "this solution"]
            .iter()
            .map(|s| s.to_string()),
    );

    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.to_lowercase()))
        .collect()
}

fn cluster_data(snapshot: &ContextSnapshot) -> Vec<serde_json::Value> {
    snapshot
        .clusters
        .iter()
        .map(|cluster| {
            json!({
                "title": cluster.title,
                "intent": cluster.intent,
                "keywords": cluster.keyword_list(),
            })
        })
        .collect()
}

/// The idea being written about.
#[derive(Clone, Debug, Default)]
pub struct PromptTopic {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<BacklogCategory>,
}

#[derive(Clone, Debug)]
pub struct PromptPlan {
    pub prompt: String,
    pub archetype: ContentArchetype,
    pub synonyms: Vec<String>,
}

pub struct PromptBuilder {
    handlebars: Handlebars<'static>,
}

impl PromptBuilder {
    pub fn new() -> CoreResult<Self> {
        let mut handlebars = get_handlebars();
        for (name, template) in [
            (GENERATION_TEMPLATE, GENERATION_PROMPT),
            (IDEAS_TEMPLATE, IDEAS_PROMPT),
        ] {
            handlebars
                .register_template_string(name, template)
                .map_err(|e| CoreError::internal(format!("Invalid prompt template {}: {}", name, e)))?;
        }
        Ok(Self { handlebars })
    }

    /// Prompt asking for `count` new backlog ideas grounded in the snapshot.
    pub fn build_ideas(&self, snapshot: &ContextSnapshot, count: usize) -> CoreResult<String> {
        let brand = product_synonyms(&snapshot.project.title)
            .into_iter()
            .next()
            .unwrap_or_else(|| snapshot.project.title.clone());
        let categories: Vec<&str> = BacklogCategory::ALL.iter().map(|c| c.as_str()).collect();

        let data = json!({
            "count": count,
            "language": snapshot.language,
            "brand": brand,
            "hypothesis": {"title": snapshot.hypothesis.title},
            "icp": {
                "persona": snapshot.icp.persona,
                "pains": snapshot.icp.pains,
                "goals": snapshot.icp.goals,
                "triggers": snapshot.icp.triggers,
            },
            "canvas": {"problems": snapshot.lean_canvas.problems},
            "clusters": cluster_data(snapshot),
            "categories": categories,
        });

        self.handlebars
            .render(IDEAS_TEMPLATE, &data)
            .map_err(|e| CoreError::internal(format!("Failed to render prompt: {}", e)))
    }

    pub fn build(
        &self,
        snapshot: &ContextSnapshot,
        topic: &PromptTopic,
        format: ContentFormat,
        language: &str,
        extra_instructions: Option<&str>,
    ) -> CoreResult<PromptPlan> {
        let archetype = classify(topic.category, &topic.title);
        let synonyms = product_synonyms(&snapshot.project.title);
        let (topic_share, product_share) = archetype.content_ratio();
        let (min_words, max_words) = archetype.word_count(format);

        let data = json!({
            "project": {"title": snapshot.project.title},
            "hypothesis": {
                "title": snapshot.hypothesis.title,
                "description": snapshot.hypothesis.description,
            },
            "canvas": {
                "problems": snapshot.lean_canvas.problems,
                "solutions": snapshot.lean_canvas.solutions,
                "uvp": snapshot.lean_canvas.unique_value_proposition,
                "segments": snapshot.lean_canvas.customer_segments,
            },
            "icp": {
                "persona": snapshot.icp.persona,
                "pains": snapshot.icp.pains,
                "goals": snapshot.icp.goals,
                "triggers": snapshot.icp.triggers,
            },
            "clusters": cluster_data(snapshot),
            "idea": {
                "title": topic.title,
                "description": topic.description,
                "category": topic.category.map(|c| c.as_str()),
            },
            "archetype": {
                "name": archetype.as_str(),
                "topic_share": topic_share,
                "product_share": product_share,
                "guidance": archetype.guidance(),
            },
            "format_label": match format {
                ContentFormat::Article => "long-form blog article",
                ContentFormat::CommercialPage => "commercial landing page",
            },
            "language": language,
            "words": {"min": min_words, "max": max_words},
            "synonyms": synonyms,
            "extra": extra_instructions.map(str::trim).filter(|s| !s.is_empty()),
        });

        let prompt = self
            .handlebars
            .render(GENERATION_TEMPLATE, &data)
            .map_err(|e| CoreError::internal(format!("Failed to render prompt: {}", e)))?;

        Ok(PromptPlan {
            prompt,
            archetype,
            synonyms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::entities::hypotheses::{IcpProfile, LeanCanvas};
    use crate::database::entities::{hypotheses, projects, seo_clusters};
    use chrono::Utc;

    fn snapshot() -> ContextSnapshot {
        let now = Utc::now();
        ContextSnapshot {
            project: projects::Model {
                id: 1,
                owner_id: 1,
                title: "Acme CRM for small teams".to_string(),
                language: None,
                info_language: None,
                settings_language: None,
                created_at: now,
                updated_at: now,
            },
            hypothesis: hypotheses::Model {
                id: 2,
                project_id: 1,
                title: "Founders lose leads in spreadsheets".to_string(),
                description: None,
                lean_canvas: None,
                icp: None,
                created_at: now,
                updated_at: now,
            },
            lean_canvas: LeanCanvas {
                problems: vec!["Leads slip through".to_string()],
                unique_value_proposition: Some("A CRM you set up in 5 minutes".to_string()),
                ..Default::default()
            },
            icp: IcpProfile {
                persona: Some("Solo founder".to_string()),
                pains: vec!["No follow-up system".to_string()],
                ..Default::default()
            },
            clusters: vec![seo_clusters::Model {
                id: 3,
                project_id: 1,
                hypothesis_id: 2,
                title: "Lead tracking".to_string(),
                intent: "informational".to_string(),
                keywords: r#"["lead tracking","crm for startups"]"#.to_string(),
                created_by: 1,
                updated_by: 1,
                created_at: now,
                updated_at: now,
            }],
            language: "English".to_string(),
        }
    }

    #[test]
    fn test_classify() {
        use BacklogCategory::*;
        assert_eq!(classify(Some(Pain), "Why follow-ups fail"), ContentArchetype::PainPoint);
        assert_eq!(classify(Some(Pain), "How to follow up"), ContentArchetype::Tutorial);
        assert_eq!(classify(Some(Info), "CRM FAQ"), ContentArchetype::Faq);
        assert_eq!(classify(Some(Faq), "Pricing"), ContentArchetype::Faq);
        assert_eq!(classify(Some(Info), "Getting started with pipelines"), ContentArchetype::Onboarding);
        assert_eq!(classify(Some(Goal), "Close more deals"), ContentArchetype::Solution);
        assert_eq!(classify(Some(Trigger), "Your first hire"), ContentArchetype::Trigger);
        assert_eq!(classify(None, "A solution for lost leads"), ContentArchetype::Solution);
        assert_eq!(classify(Some(Info), "The state of sales"), ContentArchetype::General);
    }

    #[test]
    fn test_ratios() {
        assert_eq!(ContentArchetype::Trigger.content_ratio(), (90, 10));
        assert_eq!(ContentArchetype::Tutorial.content_ratio(), (90, 10));
        assert_eq!(ContentArchetype::Feature.content_ratio(), (85, 15));
        assert_eq!(ContentArchetype::Faq.content_ratio(), (95, 5));
    }

    #[test]
    fn test_synonyms_are_deduplicated() {
        assert_eq!(brand_name("Acme CRM for small teams").as_deref(), Some("Acme CRM"));
        assert_eq!(brand_name("the best tool").as_deref(), None);
        assert_eq!(
            product_synonyms("Acme"),
            vec!["Acme", "the platform", "the service", "the tool", "this solution"]
        );
        let synonyms = product_synonyms("Acme CRM for small teams");
        assert_eq!(synonyms[0], "Acme CRM");
        assert_eq!(synonyms[1], "Acme CRM for small teams");
    }

    #[test]
    fn test_prompt_contents_and_determinism() {
        let builder = PromptBuilder::new().unwrap();
        let topic = PromptTopic {
            title: "Why leads go cold".to_string(),
            description: Some("Follow-up timing".to_string()),
            category: Some(BacklogCategory::Pain),
        };
        let plan = builder
            .build(&snapshot(), &topic, ContentFormat::Article, "Russian", None)
            .unwrap();
        let again = builder
            .build(&snapshot(), &topic, ContentFormat::Article, "Russian", None)
            .unwrap();

        assert_eq!(plan.prompt, again.prompt);
        assert_eq!(plan.archetype, ContentArchetype::PainPoint);
        assert!(plan.prompt.contains("Write a long-form blog article in Russian"));
        assert!(plan.prompt.contains("85% exploration of the topic itself, 15% product mention"));
        assert!(plan.prompt.contains("1500 to 2500 words"));
        assert!(plan.prompt.contains("\"outline\""));
        assert!(plan.prompt.contains("\"compliance\""));
        assert!(plan.prompt.contains("lead tracking, crm for startups"));
        assert!(plan.prompt.contains("Acme CRM, Acme CRM for small teams, the platform"));
        assert!(plan.prompt.contains("A CRM you set up in 5 minutes"));
    }

    #[test]
    fn test_ideas_prompt() {
        let builder = PromptBuilder::new().unwrap();
        let prompt = builder.build_ideas(&snapshot(), 5).unwrap();
        assert!(prompt.starts_with(
            "Suggest 5 SEO content ideas in English for Acme CRM (Founders lose leads in spreadsheets)."
        ));
        assert!(prompt.contains("Audience: Solo founder\n"));
        assert!(prompt.contains("Problems: Leads slip through\n"));
        assert!(!prompt.contains("Goals:"));
        assert!(prompt.contains("- Lead tracking (informational): lead tracking, crm for startups\n"));
        assert!(prompt.contains("pain, goal, trigger, feature, benefit, faq, info"));
        assert!(prompt.contains(r#"{"ideas": [{"title""#));
    }
}
