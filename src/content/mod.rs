pub mod classify;
pub mod raw;
pub mod standardize;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use crate::store;
pub use classify::{classify, ContentType};
pub use raw::RawContent;
pub use standardize::{standardize, StandardizedContent};

/// Files in the content store grouped by type.
#[derive(Debug, Default)]
pub struct ContentInventory {
    pub by_type: BTreeMap<ContentType, Vec<String>>,
}

impl ContentInventory {
    pub fn total(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    pub fn files(&self, content_type: ContentType) -> &[String] {
        self.by_type
            .get(&content_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Classify every file in `dir`. Store errors propagate.
pub fn analyze_directory(dir: &Path) -> Result<ContentInventory> {
    let mut inventory = ContentInventory::default();
    for file in store::list_content_files(dir)? {
        inventory
            .by_type
            .entry(classify(&file))
            .or_default()
            .push(file);
    }
    Ok(inventory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_inventory() {
        let inv = analyze_directory(Path::new("tests/fixtures/content")).unwrap();
        assert_eq!(inv.files(ContentType::Home), ["homepage.json"]);
        assert_eq!(inv.files(ContentType::Service), ["laser-light-shows.json"]);
        assert_eq!(inv.files(ContentType::Event), ["americas-250th.json"]);
        assert_eq!(inv.files(ContentType::BlogPost).len(), 2);
        assert_eq!(inv.files(ContentType::BlogCategory), ["blog_c_event-planning.json"]);
        assert!(inv.files(ContentType::Utility).is_empty());
        assert_eq!(inv.total(), 9);
    }

    #[test]
    fn laser_fixture_end_to_end() {
        let c = store::load_standardized(Path::new("tests/fixtures/content"), "laser-light-shows.json")
            .unwrap();
        assert_eq!(c.content_type, ContentType::Service);
        assert_eq!(c.standardized_sections.len(), 4);
        assert_eq!(c.featured_image.as_ref().unwrap().alt, "Featured Laser Show");
        assert_eq!(c.benefits, vec!["Safe for all ages", "Works indoors and outdoors"]);
        assert_eq!(c.features, vec!["Full-color RGB lasers", "Custom logo projection"]);
        assert_eq!(c.related_content, vec!["/services/dj-services", "/contact"]);
        assert_eq!(c.next_route(), "/services/laser-light-shows");
    }

    #[test]
    fn homepage_fixture_links() {
        let c = store::load_standardized(Path::new("tests/fixtures/content"), "homepage.json").unwrap();
        assert_eq!(c.featured_image.as_ref().unwrap().url, "/images/hero.jpg");
        assert_eq!(
            c.related_content,
            vec!["/services/foam-parties", "/services/laser-light-shows", "/events/americas-250th"]
        );
        let rewritten = c.with_rewritten_links();
        assert!(rewritten.standardized_sections[0]
            .content
            .contains(r#"href="/services/laser-light-shows?ref=home""#));
        assert!(rewritten.standardized_sections[2].content.contains(r#"href="tel:5551234567""#));
    }

    #[test]
    fn event_fixture_details() {
        let c = store::load_standardized(Path::new("tests/fixtures/content"), "americas-250th.json")
            .unwrap();
        let d = c.event_details.unwrap();
        assert_eq!(d.dates, vec!["July 4, 2026", "January 15, 2026"]);
        assert_eq!(d.location.as_deref(), Some("Anywhere in the USA"));
    }

    #[test]
    fn missing_directory_propagates() {
        assert!(analyze_directory(Path::new("tests/fixtures/does-not-exist")).is_err());
    }
}
