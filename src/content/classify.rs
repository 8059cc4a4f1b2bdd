use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Home,
    Page,
    Service,
    Event,
    BlogPost,
    BlogCategory,
    Legal,
    Utility,
    Team,
    Contact,
    Other,
}

impl ContentType {
    pub const ALL: [ContentType; 11] = [
        ContentType::Home,
        ContentType::Page,
        ContentType::Service,
        ContentType::Event,
        ContentType::BlogPost,
        ContentType::BlogCategory,
        ContentType::Legal,
        ContentType::Utility,
        ContentType::Team,
        ContentType::Contact,
        ContentType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Home => "home",
            ContentType::Page => "page",
            ContentType::Service => "service",
            ContentType::Event => "event",
            ContentType::BlogPost => "blog_post",
            ContentType::BlogCategory => "blog_category",
            ContentType::Legal => "legal",
            ContentType::Utility => "utility",
            ContentType::Team => "team",
            ContentType::Contact => "contact",
            ContentType::Other => "other",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown content type: {}", s))
    }
}

enum Rule {
    Exact(&'static str),
    Prefix(&'static str),
    OneOf(&'static [&'static str]),
}

impl Rule {
    fn matches(&self, filename: &str) -> bool {
        match self {
            Rule::Exact(name) => filename == *name,
            Rule::Prefix(p) => filename.starts_with(p),
            Rule::OneOf(names) => names.contains(&filename),
        }
    }
}

const SERVICE_FILES: &[&str] = &[
    "foam-parties.json",
    "laser-light-shows.json",
    "dj-services.json",
    "event-lighting.json",
    "sound-systems.json",
    "stage-rentals.json",
    "special-effects.json",
    "led-dance-floors.json",
    "services.json",
];

const EVENT_FILES: &[&str] = &[
    "americas-250th.json",
    "corporate-events.json",
    "festivals.json",
    "weddings.json",
    "school-events.json",
    "new-years-eve.json",
    "events.json",
];

const TEAM_FILES: &[&str] = &["our-team.json", "team.json"];

const LEGAL_FILES: &[&str] = &[
    "privacy-policy.json",
    "terms-of-service.json",
    "cookie-policy.json",
    "accessibility.json",
];

const UTILITY_FILES: &[&str] = &["sitemap.json", "404.json", "thank-you.json", "search.json"];

const PAGE_FILES: &[&str] = &["about-us.json", "faq.json", "gallery.json", "testimonials.json"];

/// Ordered; first match wins.
const RULES: &[(Rule, ContentType)] = &[
    (Rule::Exact("homepage.json"), ContentType::Home),
    (Rule::Exact("index.json"), ContentType::Home),
    (Rule::Exact("contact.json"), ContentType::Contact),
    (Rule::Exact("contact-us.json"), ContentType::Contact),
    (Rule::Exact("blog.json"), ContentType::BlogCategory),
    (Rule::Prefix("blog_b_"), ContentType::BlogPost),
    (Rule::Prefix("blog_c_"), ContentType::BlogCategory),
    (Rule::OneOf(SERVICE_FILES), ContentType::Service),
    (Rule::OneOf(EVENT_FILES), ContentType::Event),
    (Rule::OneOf(TEAM_FILES), ContentType::Team),
    (Rule::OneOf(LEGAL_FILES), ContentType::Legal),
    (Rule::OneOf(UTILITY_FILES), ContentType::Utility),
    (Rule::OneOf(PAGE_FILES), ContentType::Page),
];

/// Map a content file name to its type. Never fails; unknown names are `Other`.
pub fn classify(filename: &str) -> ContentType {
    RULES
        .iter()
        .find(|(rule, _)| rule.matches(filename))
        .map(|(_, t)| *t)
        .unwrap_or(ContentType::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_names() {
        assert_eq!(classify("homepage.json"), ContentType::Home);
        assert_eq!(classify("contact-us.json"), ContentType::Contact);
        assert_eq!(classify("blog.json"), ContentType::BlogCategory);
    }

    #[test]
    fn blog_prefixes() {
        assert_eq!(classify("blog_b_foam-party-safety-tips.json"), ContentType::BlogPost);
        assert_eq!(classify("blog_c_event-planning.json"), ContentType::BlogCategory);
        // prefix must be at the start
        assert_eq!(classify("old_blog_b_x.json"), ContentType::Other);
    }

    #[test]
    fn list_membership() {
        assert_eq!(classify("laser-light-shows.json"), ContentType::Service);
        assert_eq!(classify("americas-250th.json"), ContentType::Event);
        assert_eq!(classify("our-team.json"), ContentType::Team);
        assert_eq!(classify("privacy-policy.json"), ContentType::Legal);
        assert_eq!(classify("404.json"), ContentType::Utility);
        assert_eq!(classify("about-us.json"), ContentType::Page);
    }

    #[test]
    fn unknown_is_other() {
        assert_eq!(classify("something-else.json"), ContentType::Other);
        assert_eq!(classify(""), ContentType::Other);
    }

    #[test]
    fn deterministic() {
        let corpus = [
            "homepage.json",
            "blog_b_x.json",
            "foam-parties.json",
            "weddings.json",
            "nope.json",
        ];
        for name in corpus {
            let first = classify(name);
            for _ in 0..5 {
                assert_eq!(classify(name), first);
            }
        }
    }

    #[test]
    fn type_names_round_trip() {
        for t in ContentType::ALL {
            assert_eq!(t.as_str().parse::<ContentType>().unwrap(), t);
        }
        assert!("bogus".parse::<ContentType>().is_err());
        assert_eq!(serde_json::to_string(&ContentType::BlogPost).unwrap(), "\"blog_post\"");
    }
}
