use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// One page record as stored on disk. Every field tolerates absence, `null`,
/// or a value of the wrong JSON type; those degrade to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawContent {
    #[serde(default, deserialize_with = "or_default")]
    pub url: String,
    #[serde(default, deserialize_with = "or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "or_default")]
    pub route: String,
    #[serde(default, deserialize_with = "or_default")]
    pub meta: Meta,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<RawBody>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub resources: Option<Vec<Resource>>,
}

impl RawContent {
    pub fn main_text(&self) -> &str {
        self.content
            .as_ref()
            .and_then(|c| c.main_text.as_deref())
            .unwrap_or("")
    }

    pub fn sections(&self) -> &[RawSection] {
        self.content
            .as_ref()
            .and_then(|c| c.sections.as_deref())
            .unwrap_or(&[])
    }

    pub fn resources(&self) -> &[Resource] {
        self.resources.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, deserialize_with = "or_default")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient")]
    pub keywords: Option<Keywords>,
}

/// Keywords show up both as `"a, b, c"` and as `["a", "b", "c"]`.
/// Non-string list entries are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Keywords {
    List(Vec<serde_json::Value>),
    Text(String),
}

impl Keywords {
    pub fn to_list(&self) -> Vec<String> {
        let items: Vec<&str> = match self {
            Keywords::List(v) => v.iter().filter_map(serde_json::Value::as_str).collect(),
            Keywords::Text(s) => s.split(',').collect(),
        };
        items
            .into_iter()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBody {
    #[serde(default, deserialize_with = "lenient")]
    pub main_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_sections")]
    pub sections: Option<Vec<RawSection>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSection {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub media: Option<Vec<Media>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default, deserialize_with = "or_default")]
    pub image: String,
    #[serde(default, deserialize_with = "or_default")]
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type", default, deserialize_with = "or_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "or_default")]
    pub url: String,
    #[serde(default, deserialize_with = "or_default")]
    pub alt: String,
    #[serde(default, deserialize_with = "dimension")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "dimension")]
    pub height: Option<u32>,
}

impl Resource {
    pub fn is_image(&self) -> bool {
        self.kind == "image"
    }
}

/// `null` or a mistyped value becomes `T::default()`.
fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = serde_json::Value::deserialize(d)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// `null` or a mistyped value becomes `None`.
fn lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(d)?;
    Ok(T::deserialize(value).ok())
}

/// Non-arrays become `None`; entries that don't fit `T` are dropped.
fn lenient_list<'de, D, T>(d: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|v| T::deserialize(v).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// Like [`lenient_list`], but a malformed section stays in place as an empty
/// one so `section-{index}` ids keep pointing at the original positions.
fn lenient_sections<'de, D>(d: D) -> Result<Option<Vec<RawSection>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Array(items) => Some(
            items
                .into_iter()
                .map(|v| RawSection::deserialize(v).unwrap_or_default())
                .collect(),
        ),
        _ => None,
    })
}

/// Width/height come as `800`, `"800"`, `"800px"` or garbage; garbage becomes `None`.
fn dimension<'de, D>(d: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().trim_end_matches("px").parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_fields_degrade_to_empty() {
        let raw: RawContent = serde_json::from_str(
            r#"{"title": null, "meta": null, "content": null, "resources": null}"#,
        )
        .unwrap();
        assert_eq!(raw.title, "");
        assert_eq!(raw.main_text(), "");
        assert!(raw.sections().is_empty());
        assert!(raw.resources().is_empty());
    }

    #[test]
    fn keywords_accept_string_or_list() {
        let meta: Meta =
            serde_json::from_str(r#"{"description": "d", "keywords": "foam, party , ,fun"}"#)
                .unwrap();
        assert_eq!(meta.keywords.unwrap().to_list(), vec!["foam", "party", "fun"]);

        let meta: Meta =
            serde_json::from_str(r#"{"description": "d", "keywords": ["lasers", "lights"]}"#)
                .unwrap();
        assert_eq!(meta.keywords.unwrap().to_list(), vec!["lasers", "lights"]);
    }

    #[test]
    fn dimensions_from_numbers_and_strings() {
        let r: Resource = serde_json::from_str(
            r#"{"type": "image", "url": "/a.jpg", "alt": "a", "width": 800, "height": "600px"}"#,
        )
        .unwrap();
        assert_eq!(r.width, Some(800));
        assert_eq!(r.height, Some(600));

        let r: Resource =
            serde_json::from_str(r#"{"type": "image", "url": "/a.jpg", "width": "auto"}"#).unwrap();
        assert_eq!(r.width, None);
        assert_eq!(r.alt, "");
    }

    #[test]
    fn mistyped_fields_degrade_to_empty() {
        let raw: RawContent = serde_json::from_str(
            r#"{"title": 5, "meta": {"description": ["x"], "keywords": ["a", null, 3, "b"]},
                "content": "text", "resources": {"type": "image"}}"#,
        )
        .unwrap();
        assert_eq!(raw.title, "");
        assert_eq!(raw.meta.description, "");
        assert_eq!(raw.meta.keywords.as_ref().unwrap().to_list(), vec!["a", "b"]);
        assert!(raw.content.is_none());
        assert!(raw.resources().is_empty());

        let raw: RawContent =
            serde_json::from_str(r#"{"meta": {"keywords": 42}, "content": {"main_text": 7}}"#).unwrap();
        assert!(raw.meta.keywords.is_none());
        assert_eq!(raw.main_text(), "");
    }

    #[test]
    fn malformed_section_keeps_its_slot() {
        let raw: RawContent = serde_json::from_str(
            r#"{"content": {"sections": ["junk", {"title": "Real", "content": 3, "media": [1, {"image": "/i.jpg", "alt": "i"}]}]},
                "resources": [7, {"type": "image", "url": "/a.jpg", "alt": "a"}]}"#,
        )
        .unwrap();
        let sections = raw.sections();
        assert_eq!(sections.len(), 2);
        assert!(sections[0].title.is_none());
        assert_eq!(sections[1].title.as_deref(), Some("Real"));
        assert!(sections[1].content.is_none());
        assert_eq!(sections[1].media.as_ref().unwrap().len(), 1);
        assert_eq!(raw.resources().len(), 1);
    }

    #[test]
    fn unknown_fields_ignored() {
        let raw: RawContent =
            serde_json::from_str(r#"{"title": "T", "scraped_at": "2023-01-01", "extra": [1]}"#)
                .unwrap();
        assert_eq!(raw.title, "T");
    }
}
