use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::classify::{classify, ContentType};
use super::raw::{Media, RawContent, Resource};
use crate::routes;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December) \d{1,2}, \d{4}\b",
    )
    .unwrap()
});
static LI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<li[^>]*>(.*?)</li>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub const MAIN_SECTION_ID: &str = "main-content";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<Media>>,
    #[serde(rename = "className", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    pub name: String,
    pub summary: String,
    pub dates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StandardizedContent {
    #[serde(skip)]
    pub filename: String,
    #[serde(flatten)]
    pub raw: RawContent,
    pub standardized_sections: Vec<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<Resource>,
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_content: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_details: Option<EventDetails>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub benefits: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl StandardizedContent {
    /// Nested-scheme path for this page; falls back to the slugified title.
    pub fn next_route(&self) -> String {
        if self.raw.route.is_empty() {
            format!("/{}", routes::slugify(&self.raw.title))
        } else {
            routes::legacy_to_next(&self.raw.route)
        }
    }

    /// Same record with every section body passed through the link rewriter.
    pub fn with_rewritten_links(&self) -> StandardizedContent {
        let mut out = self.clone();
        for section in &mut out.standardized_sections {
            section.content = routes::rewrite_links(&section.content);
        }
        out
    }
}

pub fn standardize(filename: &str, raw: &RawContent) -> StandardizedContent {
    let content_type = classify(filename);
    let sections = build_sections(raw);
    let featured_image = select_featured_image(&raw.title, raw.resources()).cloned();
    let related_content = related_routes(raw, &sections);

    let (benefits, features) = if content_type == ContentType::Service {
        (
            list_items(&sections, "benefit"),
            list_items(&sections, "feature"),
        )
    } else {
        (Vec::new(), Vec::new())
    };

    let event_details = if content_type == ContentType::Event {
        Some(event_details(raw, &sections))
    } else {
        None
    };

    StandardizedContent {
        filename: filename.to_string(),
        raw: raw.clone(),
        standardized_sections: sections,
        featured_image,
        content_type,
        related_content,
        last_updated: None,
        event_details,
        benefits,
        features,
    }
}

fn build_sections(raw: &RawContent) -> Vec<Section> {
    let mut sections = Vec::with_capacity(raw.sections().len() + 1);

    let main_text = raw.main_text();
    if !main_text.is_empty() {
        sections.push(Section {
            id: MAIN_SECTION_ID.to_string(),
            title: Some(raw.title.clone()),
            content: main_text.to_string(),
            media: None,
            class_name: Some(MAIN_SECTION_ID.to_string()),
        });
    }

    for (i, s) in raw.sections().iter().enumerate() {
        let title = s
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Section {}", i + 1));
        sections.push(Section {
            id: format!("section-{}", i),
            title: Some(title),
            content: s.content.clone().unwrap_or_default(),
            media: s.media.clone(),
            class_name: None,
        });
    }

    sections
}

/// Pick the image that best represents the page.
///
/// Alt text mentioning the title, "featured" or "main" wins; otherwise the
/// first image with alt text. Ties go to array order.
pub fn select_featured_image<'a>(title: &str, resources: &'a [Resource]) -> Option<&'a Resource> {
    let title = title.to_lowercase();
    let candidates: Vec<&Resource> = resources
        .iter()
        .filter(|r| r.is_image() && !r.alt.is_empty())
        .collect();

    candidates
        .iter()
        .find(|r| {
            let alt = r.alt.to_lowercase();
            alt.contains(&title) || alt.contains("featured") || alt.contains("main")
        })
        .or_else(|| candidates.first())
        .copied()
}

fn related_routes(raw: &RawContent, sections: &[Section]) -> Vec<String> {
    let own = if raw.route.is_empty() {
        None
    } else {
        let next = routes::legacy_to_next(&raw.route);
        Some(routes::strip_trailing_slash(&next).to_string())
    };
    let mut related: Vec<String> = Vec::new();
    for section in sections {
        for link in routes::internal_links(&section.content) {
            let link = routes::strip_trailing_slash(&link).to_string();
            if Some(&link) != own.as_ref() && !related.contains(&link) {
                related.push(link);
            }
        }
    }
    related
}

fn list_items(sections: &[Section], title_keyword: &str) -> Vec<String> {
    sections
        .iter()
        .filter(|s| {
            s.title
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(title_keyword))
        })
        .flat_map(|s| LI_RE.captures_iter(&s.content).map(|c| plain_text(&c[1])))
        .filter(|item| !item.is_empty())
        .collect()
}

fn event_details(raw: &RawContent, sections: &[Section]) -> EventDetails {
    let mut dates: Vec<String> = Vec::new();
    for section in sections {
        for m in DATE_RE.find_iter(&plain_text(&section.content)) {
            let d = m.as_str().to_string();
            if !dates.contains(&d) {
                dates.push(d);
            }
        }
    }

    let location = sections
        .iter()
        .find(|s| {
            s.title.as_deref().is_some_and(|t| {
                let t = t.to_lowercase();
                t.contains("location") || t.contains("venue")
            })
        })
        .map(|s| plain_text(&s.content))
        .filter(|l| !l.is_empty());

    EventDetails {
        name: raw.title.clone(),
        summary: raw.meta.description.clone(),
        dates,
        location,
    }
}

/// Strip tags and collapse whitespace.
pub fn plain_text(html: &str) -> String {
    let no_tags = TAG_RE.replace_all(html, " ");
    WS_RE.replace_all(&no_tags, " ").trim().to_string()
}
