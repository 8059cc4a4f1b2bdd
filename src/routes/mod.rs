pub mod links;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

pub use links::{internal_links, rewrite_links};

static SLUG_STRIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_ ]").unwrap());
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").unwrap());

/// Paths under these prefixes are never remapped.
const PASSTHROUGH_PREFIXES: &[&str] = &["/blog/", "/images/", "/resources/", "/public/"];

/// Legacy flat path → nested path. Where several legacy paths share a target,
/// the first one listed is the canonical reverse mapping.
const ROUTE_PAIRS: &[(&str, &str)] = &[
    // services
    ("/services", "/services"),
    ("/foam-parties", "/services/foam-parties"),
    ("/foam-party-rentals", "/services/foam-parties"),
    ("/laser-light-shows", "/services/laser-light-shows"),
    ("/dj-services", "/services/dj-services"),
    ("/event-lighting", "/services/event-lighting"),
    ("/sound-systems", "/services/sound-systems"),
    ("/stage-rentals", "/services/stage-rentals"),
    ("/special-effects", "/services/special-effects"),
    ("/led-dance-floors", "/services/led-dance-floors"),
    // events
    ("/americas-250th", "/events/americas-250th"),
    ("/americas-250th-anniversary", "/events/americas-250th"),
    ("/corporate-events", "/events/corporate-events"),
    ("/festivals", "/events/festivals"),
    ("/weddings", "/events/weddings"),
    ("/school-events", "/events/school-events"),
    ("/new-years-eve", "/events/new-years-eve"),
    // company
    ("/about-us", "/about"),
    ("/our-team", "/team"),
    ("/contact-us", "/contact"),
    ("/faq", "/about/faq"),
    ("/gallery", "/about/gallery"),
    ("/testimonials", "/about/testimonials"),
    // legal
    ("/privacy-policy", "/legal/privacy-policy"),
    ("/terms-of-service", "/legal/terms-of-service"),
    ("/cookie-policy", "/legal/cookie-policy"),
    ("/accessibility", "/legal/accessibility"),
];

pub struct RouteTable {
    forward: HashMap<&'static str, &'static str>,
    inverse: HashMap<&'static str, &'static str>,
}

impl RouteTable {
    fn from_pairs(pairs: &'static [(&'static str, &'static str)]) -> Self {
        let mut forward = HashMap::with_capacity(pairs.len());
        let mut inverse = HashMap::with_capacity(pairs.len());
        for &(legacy, next) in pairs {
            forward.insert(legacy, next);
            inverse.entry(next).or_insert(legacy);
        }
        RouteTable { forward, inverse }
    }

    pub fn legacy_to_next(&self, path: &str) -> String {
        map_path(path, &self.forward)
    }

    pub fn next_to_legacy(&self, path: &str) -> String {
        map_path(path, &self.inverse)
    }

    /// Every legacy path that maps forward to `next`, in declaration order.
    pub fn aliases(&self, next: &str) -> Vec<&'static str> {
        let next = strip_trailing_slash(next);
        ROUTE_PAIRS
            .iter()
            .filter(|(_, n)| *n == next)
            .map(|(legacy, _)| *legacy)
            .collect()
    }

    /// (legacy, next) pairs in declaration order.
    pub fn pairs(&self) -> &'static [(&'static str, &'static str)] {
        ROUTE_PAIRS
    }
}

pub static ROUTES: LazyLock<RouteTable> = LazyLock::new(|| RouteTable::from_pairs(ROUTE_PAIRS));

pub fn legacy_to_next(path: &str) -> String {
    ROUTES.legacy_to_next(path)
}

pub fn next_to_legacy(path: &str) -> String {
    ROUTES.next_to_legacy(path)
}

/// Drop one trailing `/`, except from the root path.
pub fn strip_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

fn map_path(path: &str, table: &HashMap<&'static str, &'static str>) -> String {
    let stripped = strip_trailing_slash(path);
    if PASSTHROUGH_PREFIXES.iter().any(|p| stripped.starts_with(p)) {
        return path.to_string();
    }
    match table.get(stripped) {
        Some(mapped) => mapped.to_string(),
        None => path.to_string(),
    }
}

/// Lowercase, drop everything but `[A-Za-z0-9_ ]`, join words with `-`.
/// Hyphens already in the input are dropped, underscores kept.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let kept = SLUG_STRIP_RE.replace_all(&lower, "");
    SPACES_RE.replace_all(&kept, "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_lookup() {
        assert_eq!(legacy_to_next("/foam-parties"), "/services/foam-parties");
        assert_eq!(legacy_to_next("/foam-parties/"), "/services/foam-parties");
        assert_eq!(legacy_to_next("/about-us"), "/about");
    }

    #[test]
    fn unmapped_passes_through() {
        assert_eq!(legacy_to_next("/unknown-page"), "/unknown-page");
        assert_eq!(legacy_to_next("/unknown-page/"), "/unknown-page/");
        assert_eq!(legacy_to_next("/"), "/");
        assert_eq!(legacy_to_next(""), "");
    }

    #[test]
    fn passthrough_prefixes() {
        assert_eq!(legacy_to_next("/blog/foam-parties"), "/blog/foam-parties");
        assert_eq!(legacy_to_next("/images/foam-parties"), "/images/foam-parties");
        assert_eq!(legacy_to_next("/resources/x/"), "/resources/x/");
        assert_eq!(legacy_to_next("/public/logo.png"), "/public/logo.png");
    }

    #[test]
    fn reverse_lookup() {
        assert_eq!(next_to_legacy("/services/laser-light-shows"), "/laser-light-shows");
        assert_eq!(next_to_legacy("/team/"), "/our-team");
        assert_eq!(next_to_legacy("/not/mapped"), "/not/mapped");
    }

    #[test]
    fn round_trip_for_unaliased_routes() {
        for &(legacy, next) in ROUTE_PAIRS {
            if ROUTES.aliases(next).len() == 1 {
                assert_eq!(next_to_legacy(&legacy_to_next(legacy)), legacy, "{}", legacy);
            }
        }
    }

    #[test]
    fn aliased_routes_reverse_to_first_declared() {
        assert_eq!(legacy_to_next("/americas-250th"), "/events/americas-250th");
        assert_eq!(legacy_to_next("/americas-250th-anniversary"), "/events/americas-250th");
        assert_eq!(next_to_legacy("/events/americas-250th"), "/americas-250th");
        assert_eq!(
            ROUTES.aliases("/events/americas-250th"),
            vec!["/americas-250th", "/americas-250th-anniversary"]
        );
    }

    #[test]
    fn slugify_literal_cases() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("dashes-and_underscores"), "dashesand_underscores");
        assert_eq!(slugify("Foam  Parties!!"), "foam-parties");
        assert_eq!(slugify("America's 250th"), "americas-250th");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn slugify_idempotent_on_single_words() {
        for input in ["Hello", "dashes-and_underscores", "LED_Floors", "250th!"] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "{}", input);
        }
    }
}
