use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use pageforge_config::Config;
use pageforge_engine::{DocumentStore, Page, PageId, io};

#[derive(Parser)]
#[command(version, about = "pageforge - block-based pages with HTML export", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the JSON document file (overrides config)
    #[arg(long)]
    document: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the page tree
    List,
    /// Create a page
    New {
        title: String,

        /// Title or id of the parent page
        #[arg(long)]
        parent: Option<String>,
    },
    /// Rename a page
    Rename { page: String, title: String },
    /// Delete a page and its subpages
    Delete { page: String },
    /// Make a page the active one
    Switch { page: String },
    /// Export one page as standalone HTML
    Export {
        page: String,

        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export all pages with navigation
    ExportAll {
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export all pages into a zip archive
    ExportArchive {
        /// Output file
        #[arg(long, default_value = "pages.zip")]
        out: PathBuf,
    },
    /// Import HTML files (or a zip archive) as pages
    Import { files: Vec<PathBuf> },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    let document_path = cli
        .document
        .or_else(|| config.as_ref().map(|c| c.document_path.clone()))
        .unwrap_or_else(|| PathBuf::from("pages.json"));
    let export_dir = config.and_then(|c| c.export_dir).unwrap_or_else(|| {
        document_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    });

    let mut store = load_or_init(&document_path)?;

    match cli.command {
        Commands::List => {
            print_tree(&store);
            return Ok(());
        }
        Commands::New { title, parent } => {
            let parent_id = parent
                .map(|needle| find_page(&store, &needle))
                .transpose()?;
            let id = store.create_page(&title, parent_id.as_ref())?;
            println!("Created page {id} ({title})");
        }
        Commands::Rename { page, title } => {
            let id = find_page(&store, &page)?;
            store.rename_page(&id, &title)?;
            println!("Renamed {id} to {title}");
        }
        Commands::Delete { page } => {
            let id = find_page(&store, &page)?;
            let removed = store.delete_page(&id)?;
            println!("Deleted {removed} page(s)");
        }
        Commands::Switch { page } => {
            let id = find_page(&store, &page)?;
            store.set_active(&id)?;
            println!("Active page: {}", store.active_page().title);
        }
        Commands::Export { page, out } => {
            let id = find_page(&store, &page)?;
            let dir = out.unwrap_or(export_dir);
            let path = io::export_single_page(&store, &id, &dir)?;
            println!("Exported {}", path.display());
            return Ok(());
        }
        Commands::ExportAll { out } => {
            let dir = out.unwrap_or(export_dir);
            let written = io::export_all_pages(&store, &dir)?;
            println!("Exported {} page(s) to {}", written.len(), dir.display());
            return Ok(());
        }
        Commands::ExportArchive { out } => {
            io::export_archive(&store, &out)?;
            println!("Exported archive {}", out.display());
            return Ok(());
        }
        Commands::Import { files } => {
            if files.is_empty() {
                bail!("nothing to import");
            }
            let pages = if files.len() == 1 && is_archive(&files[0]) {
                io::import_archive(&files[0])?
            } else {
                io::import_html_files(&files)?
            };
            let count = pages.len();
            store.register_imported_pages(pages);
            println!("Imported {count} page(s)");
        }
    }

    io::save_document(&store, &document_path)
        .with_context(|| format!("failed to save {}", document_path.display()))?;
    Ok(())
}

fn load_or_init(path: &Path) -> Result<DocumentStore> {
    match io::load_document(path) {
        Ok(store) => Ok(store),
        Err(io::IoError::NotFound(_)) => Ok(DocumentStore::new("Home")),
        Err(e) => Err(e).with_context(|| format!("failed to load {}", path.display())),
    }
}

fn is_archive(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "zip")
}

/// Resolves a page reference given as a title or an id.
fn find_page(store: &DocumentStore, needle: &str) -> Result<PageId> {
    if let Some(page) = store.pages_in_order().find(|page| page.title == needle) {
        return Ok(page.id.clone());
    }
    if let Some(page) = store
        .pages_in_order()
        .find(|page| page.id.as_str() == needle)
    {
        return Ok(page.id.clone());
    }
    bail!("no page titled `{needle}` (and no page with that id)");
}

fn print_tree(store: &DocumentStore) {
    fn print_page(page: &Page, depth: usize, store: &DocumentStore) {
        let marker = if page.id == *store.active_id() {
            "*"
        } else {
            " "
        };
        let emoji = page.emoji.as_deref().unwrap_or("");
        println!(
            "{marker} {:indent$}{emoji} {} [{}]",
            "",
            page.title,
            page.id,
            indent = depth * 2
        );
        for child in &page.children {
            if let Ok(child_page) = store.get_page(child) {
                print_page(child_page, depth + 1, store);
            }
        }
    }

    for root in store.root_pages() {
        print_page(root, 0, store);
    }
}
