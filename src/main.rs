mod content;
mod db;
mod routes;
mod sitemap;
mod store;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use content::{ContentType, StandardizedContent};

const BUILD_CHUNK: usize = 200;

#[derive(Parser)]
#[command(name = "site_content", about = "Content pipeline for the event-production site")]
struct Cli {
    /// Directory holding one JSON file per page
    #[arg(long, global = true, env = "SITE_CONTENT_DIR", default_value = store::DEFAULT_CONTENT_DIR)]
    content_dir: PathBuf,

    /// SQLite database written by `build`
    #[arg(long, global = true, env = "SITE_DB", default_value = db::DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Public base URL used for sitemap entries
    #[arg(long, global = true, env = "SITE_BASE_URL", default_value = "https://www.example.com")]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List content files
    List,
    /// Show the content type of every file (or one file)
    Classify {
        #[arg(short, long)]
        file: Option<String>,
        /// Only list files of this type (e.g. blog_post)
        #[arg(short = 't', long = "type", conflicts_with = "file")]
        content_type: Option<ContentType>,
    },
    /// Standardize one content file and print it as JSON
    Show {
        /// Content file name, or a nested route with --from-db
        target: String,
        /// Rewrite legacy links inside section bodies
        #[arg(long, conflicts_with = "from_db")]
        rewrite_links: bool,
        /// Print the document exported for a nested route instead
        #[arg(long)]
        from_db: bool,
    },
    /// Blog listing (falls back to built-in posts if the content dir is missing)
    Blog,
    /// Standardize all content and export it to SQLite
    Build {
        /// Max files to build (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show statistics for the exported database
    Stats,
    /// Map a path between the legacy and nested schemes
    Route {
        path: String,
        /// Map nested → legacy instead
        #[arg(short, long)]
        reverse: bool,
    },
    /// Slugify a title
    Slug { text: String },
    /// Rewrite legacy links in an HTML file (stdin when omitted)
    Rewrite { file: Option<PathBuf> },
    /// Write sitemap.xml for all content
    Sitemap {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Redirects needed for the URLs in a legacy sitemap
    Redirects { sitemap: PathBuf },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let dir = cli.content_dir.as_path();

    let result = match cli.command {
        Commands::List => {
            let files = store::list_content_files(dir)?;
            for f in &files {
                println!("{}", f);
            }
            println!("\n{} content files in {}", files.len(), dir.display());
            Ok(())
        }
        Commands::Classify { file: Some(file), .. } => {
            println!("{}", content::classify(&file));
            Ok(())
        }
        Commands::Classify { file: None, content_type: Some(content_type) } => {
            let inventory = content::analyze_directory(dir)?;
            let files = inventory.files(content_type);
            for f in files {
                println!("{}", f);
            }
            println!("\n{} {} files", files.len(), content_type);
            Ok(())
        }
        Commands::Classify { file: None, content_type: None } => {
            let inventory = content::analyze_directory(dir)?;
            for (content_type, files) in &inventory.by_type {
                println!("{} ({})", content_type, files.len());
                for f in files {
                    println!("  {}", f);
                }
            }
            println!("\n{} files", inventory.total());
            Ok(())
        }
        Commands::Show { target, from_db: true, .. } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            match db::fetch_document(&conn, &target)? {
                Some(doc) => {
                    let value: serde_json::Value = serde_json::from_str(&doc)
                        .with_context(|| format!("Stored document for {} is not JSON", target))?;
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                None => println!("No page stored for {} in {}.", target, cli.db.display()),
            }
            Ok(())
        }
        Commands::Show { target, rewrite_links, from_db: false } => {
            let content = store::load_standardized(dir, &target)?;
            let content = if rewrite_links {
                content.with_rewritten_links()
            } else {
                content
            };
            println!("{}", serde_json::to_string_pretty(&content)?);
            Ok(())
        }
        Commands::Blog => {
            let posts = store::load_blog_posts(dir)?;
            for p in &posts {
                println!("{:<40} | {}", store::truncate_chars(&p.title, 40), p.route);
                if !p.excerpt.is_empty() {
                    println!("    {}", store::truncate_chars(&p.excerpt, 100));
                }
            }
            println!("\n{} posts", posts.len());
            Ok(())
        }
        Commands::Build { limit } => {
            let mut files = store::list_content_files(dir)?;
            if let Some(n) = limit {
                files.truncate(n);
            }
            if files.is_empty() {
                println!("No content files in {}.", dir.display());
                return Ok(());
            }
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            println!("Building {} pages...", files.len());
            let counts = build_pages(&conn, dir, &files)?;
            let routes = db::save_routes(&conn, &routes::ROUTES)?;
            counts.print();
            println!("Saved {} routes to {}.", routes, cli.db.display());
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Pages:     {}", s.pages);
            for (content_type, n) in &s.by_type {
                println!("  {:<14} {}", content_type.as_str(), n);
            }
            println!("Sections:  {}", s.sections);
            println!("Resources: {}", s.resources);
            println!("Featured:  {}", s.featured);
            println!("Routes:    {}", s.routes);
            Ok(())
        }
        Commands::Route { path, reverse } => {
            if reverse {
                let aliases = routes::ROUTES.aliases(&path);
                println!("{}", routes::next_to_legacy(&path));
                if aliases.len() > 1 {
                    println!("  aliases: {}", aliases.join(", "));
                }
            } else {
                println!("{}", routes::legacy_to_next(&path));
            }
            Ok(())
        }
        Commands::Slug { text } => {
            println!("{}", routes::slugify(&text));
            Ok(())
        }
        Commands::Rewrite { file } => {
            let html = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            print!("{}", routes::rewrite_links(&html));
            Ok(())
        }
        Commands::Sitemap { output } => {
            let entries = sitemap_entries(dir)?;
            let xml = sitemap::write_urlset(&cli.base_url, &entries)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, xml)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {} URLs to {}", entries.len(), path.display());
                }
                None => println!("{}", xml),
            }
            Ok(())
        }
        Commands::Redirects { sitemap: path } => {
            let xml = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let locs = sitemap::parse_urlset(&xml)?;
            let plan = sitemap::redirect_plan(&cli.base_url, &locs);
            for (legacy, next) in &plan {
                println!("{} -> {}", legacy, next);
            }
            println!("\n{} of {} URLs need a redirect", plan.len(), locs.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

struct BuildCounts {
    pages: usize,
    sections: usize,
    featured: usize,
    by_type: std::collections::BTreeMap<ContentType, usize>,
}

impl BuildCounts {
    fn print(&self) {
        println!(
            "Saved {} pages, {} sections, {} with featured images.",
            self.pages, self.sections, self.featured,
        );
        for (content_type, n) in &self.by_type {
            println!("  {:<14} {}", content_type.as_str(), n);
        }
    }
}

fn build_pages(
    conn: &rusqlite::Connection,
    dir: &Path,
    files: &[String],
) -> anyhow::Result<BuildCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = BuildCounts {
        pages: 0,
        sections: 0,
        featured: 0,
        by_type: Default::default(),
    };

    for chunk in files.chunks(BUILD_CHUNK) {
        let pages = chunk
            .par_iter()
            .map(|f| store::load_standardized(dir, f))
            .collect::<Result<Vec<StandardizedContent>, _>>()?;

        for p in &pages {
            counts.sections += p.standardized_sections.len();
            counts.featured += usize::from(p.featured_image.is_some());
            *counts.by_type.entry(p.content_type).or_default() += 1;
        }
        counts.pages += db::save_pages(conn, &pages)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    info!("Built {} pages from {}", counts.pages, dir.display());
    Ok(counts)
}

fn sitemap_entries(dir: &Path) -> anyhow::Result<Vec<sitemap::SitemapEntry>> {
    let mut entries = Vec::new();
    for file in store::list_content_files(dir)? {
        let content = store::load_standardized(dir, &file)?;
        if content.content_type == ContentType::Utility {
            continue;
        }
        entries.push(sitemap::SitemapEntry {
            path: content.next_route(),
            last_modified: content.last_updated,
        });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    entries.dedup_by(|a, b| a.path == b.path);
    Ok(entries)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
