use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::content::raw::Resource;
use crate::content::standardize::plain_text;
use crate::content::{standardize, RawContent, StandardizedContent};
use crate::routes::slugify;

pub const DEFAULT_CONTENT_DIR: &str = "data/content";

const BLOG_POST_PREFIX: &str = "blog_b_";
const EXCERPT_CHARS: usize = 160;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ContentError {
    pub fn is_missing_directory(&self) -> bool {
        matches!(self, ContentError::MissingDirectory(_))
    }
}

/// Every `*.json` file name in `dir`, in directory enumeration order.
pub fn list_content_files(dir: &Path) -> Result<Vec<String>, ContentError> {
    let entries = fs::read_dir(dir).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ContentError::MissingDirectory(dir.to_path_buf()),
        _ => ContentError::Io {
            path: dir.to_path_buf(),
            source: e,
        },
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ContentError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            files.push(name.to_string());
        }
    }
    debug!("Found {} content files in {}", files.len(), dir.display());
    Ok(files)
}

/// Read and parse one content file. No caching: every call hits the disk.
pub fn read_content(dir: &Path, filename: &str) -> Result<RawContent, ContentError> {
    let path = dir.join(filename);
    let text = fs::read_to_string(&path).map_err(|source| ContentError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ContentError::Parse { path, source })
}

/// Read, standardize, and stamp `last_updated` from the file's mtime.
pub fn load_standardized(dir: &Path, filename: &str) -> Result<StandardizedContent, ContentError> {
    let raw = read_content(dir, filename)?;
    let mut content = standardize(filename, &raw);
    content.last_updated = modified_at(&dir.join(filename));
    Ok(content)
}

fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Utc>::from(modified))
}

// ── Blog ──

#[derive(Debug, Clone, Serialize)]
pub struct BlogPost {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub route: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<Resource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Blog listing. A missing content directory falls back to the built-in
/// posts; any other failure propagates.
pub fn load_blog_posts(dir: &Path) -> Result<Vec<BlogPost>, ContentError> {
    let files = match list_content_files(dir) {
        Ok(files) => files,
        Err(e) if e.is_missing_directory() => {
            warn!("{}; using fallback blog posts", e);
            return Ok(fallback_blog_posts());
        }
        Err(e) => return Err(e),
    };

    let mut posts = Vec::new();
    for file in files.iter().filter(|f| f.starts_with(BLOG_POST_PREFIX)) {
        let content = load_standardized(dir, file)?;
        posts.push(blog_post_from(file, &content));
    }

    // newest first when every post has a date, otherwise keep file order
    if posts.iter().all(|p| p.last_updated.is_some()) {
        posts.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
    }
    Ok(posts)
}

fn blog_post_from(filename: &str, content: &StandardizedContent) -> BlogPost {
    let stem = filename
        .trim_start_matches(BLOG_POST_PREFIX)
        .trim_end_matches(".json");
    let slug = if stem.is_empty() {
        slugify(&content.raw.title)
    } else {
        stem.to_string()
    };

    let excerpt = if content.raw.meta.description.is_empty() {
        truncate_chars(&plain_text(content.raw.main_text()), EXCERPT_CHARS)
    } else {
        content.raw.meta.description.clone()
    };

    let route = if content.raw.route.starts_with("/blog/") {
        content.raw.route.clone()
    } else {
        format!("/blog/{}", slug)
    };

    BlogPost {
        slug,
        title: content.raw.title.clone(),
        excerpt,
        route,
        featured_image: content.featured_image.clone(),
        last_updated: content.last_updated,
    }
}

/// At most `max` chars, with `...` appended when anything was cut.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated.trim_end())
    }
}

const FALLBACK_POSTS: &[(&str, &str, &str)] = &[
    (
        "foam-party-safety-tips",
        "Foam Party Safety Tips",
        "How we keep foam parties safe and fun for every age group.",
    ),
    (
        "planning-a-laser-light-show",
        "Planning a Laser Light Show",
        "Venue, timing and power: what to sort out before the lasers go on.",
    ),
    (
        "americas-250th-celebration-ideas",
        "America's 250th Celebration Ideas",
        "Ways to make a 2026 semiquincentennial event stand out.",
    ),
];

fn fallback_blog_posts() -> Vec<BlogPost> {
    FALLBACK_POSTS
        .iter()
        .map(|(slug, title, excerpt)| BlogPost {
            slug: slug.to_string(),
            title: title.to_string(),
            excerpt: excerpt.to_string(),
            route: format!("/blog/{}", slug),
            featured_image: None,
            last_updated: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURES: &str = "tests/fixtures/content";

    #[test]
    fn lists_only_json_files() {
        let mut files = list_content_files(Path::new(FIXTURES)).unwrap();
        files.sort();
        assert_eq!(files.len(), 9);
        assert!(files.iter().all(|f| f.ends_with(".json")));
        assert!(files.contains(&"homepage.json".to_string()));
    }

    #[test]
    fn missing_directory_error() {
        let err = list_content_files(Path::new("tests/fixtures/nope")).unwrap_err();
        assert!(err.is_missing_directory());
    }

    #[test]
    fn reads_fixture() {
        let raw = read_content(Path::new(FIXTURES), "laser-light-shows.json").unwrap();
        assert_eq!(raw.title, "Laser Light Shows");
        assert_eq!(raw.route, "/laser-light-shows");
        assert_eq!(raw.sections().len(), 3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_content(Path::new(FIXTURES), "absent.json").unwrap_err();
        assert!(matches!(err, ContentError::Io { .. }));
        assert!(!err.is_missing_directory());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = read_content(Path::new("tests/fixtures/malformed"), "blog_b_broken.json").unwrap_err();
        assert!(matches!(err, ContentError::Parse { .. }));
        assert!(err.to_string().contains("blog_b_broken.json"));
    }

    #[test]
    fn standardized_has_timestamp() {
        let c = load_standardized(Path::new(FIXTURES), "homepage.json").unwrap();
        assert!(c.last_updated.is_some());
        assert_eq!(c.filename, "homepage.json");
    }

    #[test]
    fn blog_posts_from_fixtures() {
        let posts = load_blog_posts(Path::new(FIXTURES)).unwrap();
        assert_eq!(posts.len(), 2);
        let tips = posts
            .iter()
            .find(|p| p.slug == "foam-party-safety-tips")
            .unwrap();
        assert_eq!(tips.route, "/blog/foam-party-safety-tips");
        assert_eq!(tips.excerpt, "Keep the bubbles fun and the floor dry.");
        assert!(tips.featured_image.is_some());

        let trends = posts.iter().find(|p| p.slug == "lighting-trends").unwrap();
        assert!(trends.excerpt.starts_with("Uplighting is back"));
    }

    #[test]
    fn blog_fallback_on_missing_directory() {
        let posts = load_blog_posts(Path::new("tests/fixtures/nope")).unwrap();
        assert_eq!(posts.len(), FALLBACK_POSTS.len());
        assert!(posts.iter().all(|p| p.route.starts_with("/blog/")));
    }

    #[test]
    fn blog_parse_error_propagates() {
        // malformed/ holds a blog post with invalid JSON
        assert!(load_blog_posts(Path::new("tests/fixtures/malformed")).is_err());
    }

    #[test]
    fn excerpt_truncation() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef ghij", 7), "abcdef...");
        assert_eq!(plain_text("<p>Hello <b>you</b></p>\n<p>there</p>"), "Hello you there");
    }
}
