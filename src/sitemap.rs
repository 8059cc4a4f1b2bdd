use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::info;

use crate::routes::legacy_to_next;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

pub struct SitemapEntry {
    pub path: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Render a sitemaps.org `urlset` for `entries` under `base_url`.
pub fn write_urlset(base_url: &str, entries: &[SitemapEntry]) -> Result<String> {
    let base = base_url.trim_end_matches('/');
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(Event::Start(urlset))?;

    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &format!("{}{}", base, entry.path))?;
        if let Some(ts) = entry.last_modified {
            write_text_element(&mut writer, "lastmod", &ts.format("%Y-%m-%d").to_string())?;
        }
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    let xml = String::from_utf8(writer.into_inner()).context("sitemap is not valid UTF-8")?;
    info!("Wrote sitemap with {} URLs", entries.len());
    Ok(xml)
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Parse a urlset XML and return all <loc> URLs.
pub fn parse_urlset(xml: &str) -> Result<Vec<String>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut urls = Vec::new();
    let mut in_url = false;
    let mut in_loc = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"url" => in_url = true,
                b"loc" if in_url => in_loc = true,
                _ => {}
            },
            Ok(Event::Text(e)) if in_loc => {
                let loc = e.unescape()?.trim().to_string();
                if !loc.is_empty() {
                    urls.push(loc);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"loc" => in_loc = false,
                b"url" => in_url = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }
    Ok(urls)
}

/// `(legacy, next)` path pairs for every URL on `base_url` whose path the
/// route table moves. URLs on other hosts and unchanged paths are dropped.
pub fn redirect_plan(base_url: &str, locs: &[String]) -> Vec<(String, String)> {
    let base = base_url.trim_end_matches('/');
    locs.iter()
        .filter_map(|loc| {
            let path = loc.strip_prefix(base)?;
            let path = if path.is_empty() { "/" } else { path };
            if !path.starts_with('/') {
                return None;
            }
            let next = legacy_to_next(path);
            (next != path).then(|| (path.to_string(), next))
        })
        .collect()
}
