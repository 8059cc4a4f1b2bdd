use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::content::{ContentType, StandardizedContent};
use crate::routes::RouteTable;

pub const DEFAULT_DB_PATH: &str = "data/site.sqlite";

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS pages (
            filename       TEXT PRIMARY KEY,
            url            TEXT NOT NULL,
            title          TEXT NOT NULL,
            route          TEXT NOT NULL,
            next_route     TEXT NOT NULL,
            content_type   TEXT NOT NULL,
            description    TEXT NOT NULL,
            keywords       TEXT,
            featured_url   TEXT,
            featured_alt   TEXT,
            document       TEXT NOT NULL,
            last_updated   TEXT,
            built_at       TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_pages_type ON pages(content_type);
        CREATE INDEX IF NOT EXISTS idx_pages_next_route ON pages(next_route);

        CREATE TABLE IF NOT EXISTS sections (
            page        TEXT NOT NULL REFERENCES pages(filename) ON DELETE CASCADE,
            position    INTEGER NOT NULL,
            section_id  TEXT NOT NULL,
            title       TEXT,
            content     TEXT NOT NULL,
            class_name  TEXT,
            media       TEXT,
            PRIMARY KEY (page, position)
        );

        CREATE TABLE IF NOT EXISTS resources (
            page      TEXT NOT NULL REFERENCES pages(filename) ON DELETE CASCADE,
            position  INTEGER NOT NULL,
            kind      TEXT NOT NULL,
            url       TEXT NOT NULL,
            alt       TEXT NOT NULL,
            width     INTEGER,
            height    INTEGER,
            PRIMARY KEY (page, position)
        );

        CREATE TABLE IF NOT EXISTS related_links (
            page    TEXT NOT NULL REFERENCES pages(filename) ON DELETE CASCADE,
            target  TEXT NOT NULL,
            UNIQUE(page, target)
        );

        CREATE TABLE IF NOT EXISTS routes (
            legacy  TEXT PRIMARY KEY,
            next    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_routes_next ON routes(next);
        ",
    )?;
    Ok(())
}

// ── Pages ──

/// Replace the stored rows for each page. Section bodies are stored with
/// links already rewritten to the nested scheme.
pub fn save_pages(conn: &Connection, pages: &[StandardizedContent]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut delete_stmt = tx.prepare("DELETE FROM pages WHERE filename = ?1")?;
        let mut page_stmt = tx.prepare(
            "INSERT INTO pages
             (filename, url, title, route, next_route, content_type, description,
              keywords, featured_url, featured_alt, document, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?;
        let mut section_stmt = tx.prepare(
            "INSERT INTO sections (page, position, section_id, title, content, class_name, media)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        let mut resource_stmt = tx.prepare(
            "INSERT INTO resources (page, position, kind, url, alt, width, height)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        let mut related_stmt =
            tx.prepare("INSERT OR IGNORE INTO related_links (page, target) VALUES (?1, ?2)")?;

        for page in pages {
            let rendered = page.with_rewritten_links();
            let raw = &rendered.raw;
            let keywords = raw
                .meta
                .keywords
                .as_ref()
                .map(|k| k.to_list().join(", "))
                .filter(|k| !k.is_empty());
            let document = serde_json::to_string(&rendered)?;

            delete_stmt.execute(rusqlite::params![page.filename])?;
            page_stmt.execute(rusqlite::params![
                page.filename,
                raw.url,
                raw.title,
                raw.route,
                rendered.next_route(),
                rendered.content_type.as_str(),
                raw.meta.description,
                keywords,
                rendered.featured_image.as_ref().map(|r| r.url.as_str()),
                rendered.featured_image.as_ref().map(|r| r.alt.as_str()),
                document,
                rendered.last_updated.map(|t| t.to_rfc3339()),
            ])?;

            for (pos, s) in rendered.standardized_sections.iter().enumerate() {
                let media = s.media.as_ref().map(serde_json::to_string).transpose()?;
                section_stmt.execute(rusqlite::params![
                    page.filename, pos as i64, s.id, s.title, s.content, s.class_name, media,
                ])?;
            }

            for (pos, r) in raw.resources().iter().enumerate() {
                resource_stmt.execute(rusqlite::params![
                    page.filename, pos as i64, r.kind, r.url, r.alt, r.width, r.height,
                ])?;
            }

            for target in &rendered.related_content {
                related_stmt.execute(rusqlite::params![page.filename, target])?;
            }
        }
    }
    tx.commit()?;
    Ok(pages.len())
}

pub fn save_routes(conn: &Connection, table: &RouteTable) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare("INSERT OR REPLACE INTO routes (legacy, next) VALUES (?1, ?2)")?;
        for (legacy, next) in table.pairs() {
            count += stmt.execute(rusqlite::params![legacy, next])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

// ── Stats ──

pub struct Stats {
    pub pages: usize,
    pub by_type: Vec<(ContentType, usize)>,
    pub sections: usize,
    pub resources: usize,
    pub featured: usize,
    pub routes: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let pages: usize = conn.query_row("SELECT COUNT(*) FROM pages", [], |r| r.get(0))?;
    let sections: usize = conn.query_row("SELECT COUNT(*) FROM sections", [], |r| r.get(0))?;
    let resources: usize = conn.query_row("SELECT COUNT(*) FROM resources", [], |r| r.get(0))?;
    let featured: usize = conn.query_row(
        "SELECT COUNT(*) FROM pages WHERE featured_url IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let routes: usize = conn.query_row("SELECT COUNT(*) FROM routes", [], |r| r.get(0))?;

    let mut stmt = conn.prepare(
        "SELECT content_type, COUNT(*) FROM pages GROUP BY content_type ORDER BY content_type",
    )?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    let by_type = rows
        .into_iter()
        .map(|(t, n)| Ok((t.parse::<ContentType>()?, n)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Stats {
        pages,
        by_type,
        sections,
        resources,
        featured,
        routes,
    })
}

/// Stored page document (links rewritten) by nested route.
pub fn fetch_document(conn: &Connection, next_route: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT document FROM pages WHERE next_route = ?1 LIMIT 1")?;
    let mut rows = stmt.query_map([next_route], |row| row.get::<_, String>(0))?;
    Ok(rows.next().transpose()?)
}
