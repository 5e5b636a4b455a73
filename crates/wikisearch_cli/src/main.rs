/* 📖 # How does the CLI put a server together?

1. Read `wikisearch.toml` (from `--config`, or the current directory if present)
2. Apply `--port`, `--root` and `--index` on top of it
3. Load the JSON index, if one is configured
4. Bind the listener and serve until the process is killed

Paths in the configuration are relative to the current directory. A missing
explicit `--config` file is an error; a missing `wikisearch.toml` in the current
directory just means defaults.

The server runs until the process is killed. Exit code 1 means startup failed
while reading the configuration, loading the index or binding the port.
*/

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::{info, warn};

use wikisearch_base::tracing::init_tracing;
use wikisearch_base::{FilePath, PalHandle, RealPal, WikiSearchResult};
use wikisearch_engine::config::DEFAULT_CONFIG_FILE;
use wikisearch_engine::{
    ConnectionHandler, IndexHandle, InMemoryIndex, Listener, ServerConfig, load_config,
    load_config_or_default,
};

/// Serve term searches over a precomputed relevance index, plus static files.
#[derive(Debug, Parser)]
#[command(name = "wikisearch", version)]
struct Args {
    /// Configuration file (default: wikisearch.toml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory to serve static files from
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// JSON index file ({"term": {"document": count}})
    #[arg(short, long)]
    index: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = init_tracing() {
        eprintln!("Warning: {}", e);
    }

    let current_dir = env::current_dir().unwrap_or_else(|e| {
        eprintln!("Error: Failed to get current directory: {}", e);
        process::exit(1);
    });

    let config = read_config(&current_dir, &args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    let config = apply_overrides(config, &args);

    let index = load_index(&current_dir, &config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    let document_root = current_dir.join(&config.document_root);
    info!(document_root = %document_root.display(), "serving files");
    let pal = PalHandle::new(RealPal::new(document_root));

    let handler = ConnectionHandler::new(pal, index);
    let listener = Listener::bind(&config.http_config(), handler).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    println!("wikisearch listening on http://{}/", listener.local_addr());
    listener.run();
}

fn read_config(current_dir: &Path, args: &Args) -> WikiSearchResult<ServerConfig> {
    match &args.config {
        Some(path) => {
            let (dir, file) = split_path(current_dir, path);
            load_config(&RealPal::new(dir), &file)
        }
        None => load_config_or_default(
            &RealPal::new(current_dir.to_path_buf()),
            &FilePath::from(DEFAULT_CONFIG_FILE),
        ),
    }
}

fn apply_overrides(mut config: ServerConfig, args: &Args) -> ServerConfig {
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(root) = &args.root {
        config.document_root = root.clone();
    }
    if let Some(index) = &args.index {
        config.index_file = Some(index.clone());
    }
    config
}

fn load_index(current_dir: &Path, config: &ServerConfig) -> WikiSearchResult<IndexHandle> {
    let Some(index_file) = &config.index_file else {
        warn!("no index file configured, every search will be empty");
        return Ok(IndexHandle::new(InMemoryIndex::new()));
    };
    let (dir, file) = split_path(current_dir, index_file);
    let index = InMemoryIndex::load_json(&RealPal::new(dir), &file)?;
    Ok(IndexHandle::new(index))
}

/// Split a user-supplied path into a PAL root directory and a file below it.
fn split_path(current_dir: &Path, path: &Path) -> (PathBuf, FilePath) {
    let full = current_dir.join(path);
    let dir = full
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| current_dir.to_path_buf());
    let file = full
        .file_name()
        .map(|name| FilePath::from(Path::new(name)))
        .unwrap_or_else(|| FilePath::from(""));
    (dir, file)
}
