//! Headless driver: scan a directory, lay it out, print the visible rows,
//! and wait for thumbnails to finish.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32Str};
use tracing::{info, warn};

use filepane::config::{default_config_path, load_config, load_config_from};
use filepane::error::ResultExt;
use filepane::file_list::{
    CellIcon, FileList, LayoutMode, Overlay, RenderedWindow, RowDescriptor, DEFAULT_VIEWPORT_WIDTH,
};
use filepane::logging;
use filepane::{Config, FileEntry, ThumbnailPipeline};

#[derive(Parser, Debug)]
#[command(author, version, about = "Lists a directory through the filepane engine.", long_about = None)]
struct Cli {
    /// Directory to list
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Config file (default: ~/.filepane/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Force list layout
    #[arg(long, conflicts_with = "grid")]
    list: bool,

    /// Force grid layout
    #[arg(long)]
    grid: bool,

    /// Group files by category
    #[arg(long)]
    group: bool,

    /// Include dot-files
    #[arg(long)]
    hidden: bool,

    /// Viewport width in px (drives grid columns)
    #[arg(long, default_value_t = DEFAULT_VIEWPORT_WIDTH)]
    width: f32,

    /// Fuzzy filter on file names
    #[arg(long)]
    filter: Option<String>,

    /// Groups to show collapsed
    #[arg(long = "collapse")]
    collapsed: Vec<String>,

    /// Number of rows to render
    #[arg(long, default_value_t = 40)]
    rows: usize,

    /// Don't wait for thumbnails
    #[arg(long)]
    no_wait: bool,

    /// Write the effective settings (file plus flags) back to the config file
    #[arg(long)]
    save_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init();

    let mut config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    };
    if cli.list {
        config.ui.view_mode = LayoutMode::List;
    } else if cli.grid {
        config.ui.view_mode = LayoutMode::Grid;
    }
    if cli.group {
        config.group_files_by_type = true;
    }
    let show_hidden = cli.hidden || config.ui.show_hidden;

    if cli.save_config {
        let path = cli.config.clone().unwrap_or_else(default_config_path);
        // Listing still works if the file can't be written
        if save_config(&config, &path) {
            info!(path = %path.display(), "Saved effective config");
        }
    }

    let pipeline = match ThumbnailPipeline::with_worker_pool(&config.thumbnails, None) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Err(e).context("Failed to start thumbnail pipeline");
        }
    };
    let mut list = FileList::new(config, pipeline);
    list.set_viewport_width(cli.width);

    list.set_loading(true);
    let entries = scan_dir(&cli.dir, show_hidden)
        .with_context(|| format!("Failed to scan {}", cli.dir.display()))?;
    list.set_items(entries);
    list.set_loading(false);

    if let Some(query) = cli.filter.as_deref().filter(|q| !q.is_empty()) {
        let mut matcher = NameMatcher::new(query);
        let filtered: Vec<FileEntry> = list
            .items()
            .iter()
            .filter(|entry| matcher.matches(&entry.name))
            .cloned()
            .collect();
        info!(query, matched = filtered.len(), "Applied name filter");
        list.set_filtered_items(Some(filtered));
    }

    for group in &cli.collapsed {
        if !list.toggle_group(group) {
            warn!(group = %group, "No such group to collapse");
        }
    }

    let window = list.render_window(0..cli.rows);
    print_window(&window);

    if cli.no_wait {
        return Ok(());
    }

    let start = Instant::now();
    let pending = list.thumbnails().pending_count();
    while !list.thumbnails().is_idle() {
        list.wait_for_thumbnails();
    }
    if pending > 0 {
        let window = list.render_window(0..cli.rows);
        let ready = window
            .cells()
            .filter(|c| matches!(c.icon, CellIcon::Thumbnail(_)))
            .count();
        info!(
            requested = pending,
            ready,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Thumbnails settled"
        );
        println!("\n{ready} of {pending} thumbnails ready");
    }
    Ok(())
}

fn save_config(config: &Config, path: &Path) -> bool {
    config.save_to(path).warn_on_err().is_some()
}

/// One level of `dir`, sorted by name
fn scan_dir(dir: &Path, show_hidden: bool) -> Result<Vec<FileEntry>> {
    let dir = dir
        .canonicalize()
        .with_context(|| format!("Directory not found: {}", dir.display()))?;

    let mut entries = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        if !show_hidden && entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        let (is_dir, date, size) = match fs::metadata(&path) {
            Ok(meta) => {
                let date = meta
                    .modified()
                    .map(|m| DateTime::<Local>::from(m).format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                let size = if meta.is_dir() {
                    "--".to_string()
                } else {
                    format_size(meta.len())
                };
                (meta.is_dir(), date, size)
            }
            Err(_) => (false, String::new(), String::new()),
        };
        entries.push(FileEntry::new(path, is_dir, date, size));
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    info!(dir = %dir.display(), count = entries.len(), "Scanned directory");
    Ok(entries)
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        return format!("{:.1} KB", kb);
    }
    let mb = kb / 1024.0;
    if mb < 1024.0 {
        return format!("{:.1} MB", mb);
    }
    format!("{:.1} GB", mb / 1024.0)
}

/// Case-insensitive fuzzy matcher reused across names
struct NameMatcher {
    pattern: Pattern,
    matcher: Matcher,
    buf: Vec<char>,
}

impl NameMatcher {
    fn new(query: &str) -> Self {
        Self {
            pattern: Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart),
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
            buf: Vec::with_capacity(64),
        }
    }

    fn matches(&mut self, name: &str) -> bool {
        self.buf.clear();
        let haystack = Utf32Str::new(name, &mut self.buf);
        self.pattern.score(haystack, &mut self.matcher).is_some()
    }
}

fn print_window(window: &RenderedWindow) {
    match window.overlay {
        Overlay::Loading => println!("(loading)"),
        Overlay::NoItems => println!("(no items)"),
        Overlay::None => {}
    }
    println!(
        "{:?} layout, {} column(s), {} row(s) total, {}px icons",
        window.mode, window.columns, window.row_count, window.icon_size
    );

    for row in &window.rows {
        match row {
            RowDescriptor::Header {
                name,
                count,
                collapsed,
                ..
            } => {
                let marker = if *collapsed { "+" } else { "-" };
                println!("{marker} {name} ({count})");
            }
            RowDescriptor::Items { cells, .. } if window.mode == LayoutMode::List => {
                for cell in cells {
                    println!(
                        "  {:>4} {} {:<6} {:<40} {:>10}  {}",
                        cell.display_index,
                        if cell.selected { "*" } else { " " },
                        icon_label(&cell.icon),
                        cell.entry.name,
                        cell.entry.formatted_size,
                        cell.entry.formatted_date,
                    );
                }
            }
            RowDescriptor::Items { cells, .. } => {
                let names: Vec<String> = cells
                    .iter()
                    .map(|c| format!("[{}] {}", icon_label(&c.icon), c.entry.name))
                    .collect();
                println!("  {}", names.join("  |  "));
            }
        }
    }
}

fn icon_label(icon: &CellIcon) -> &'static str {
    match icon {
        CellIcon::Thumbnail(_) => "thumb",
        CellIcon::Fallback(key) => key.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_name_matcher() {
        let mut matcher = NameMatcher::new("hol");
        assert!(matcher.matches("Holiday.png"));
        assert!(matcher.matches("h_o_l.txt"));
        assert!(!matcher.matches("readme.md"));
    }

    #[test]
    fn test_save_config_reports_failure_without_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.json");
        let mut config = Config::default();
        config.ui.view_mode = LayoutMode::List;

        assert!(save_config(&config, &path));
        assert_eq!(load_config_from(&path), config);

        // Parent is a regular file: logged and skipped
        let blocked = tmp.path().join("config.json").join("inner.json");
        fs::write(tmp.path().join("config.json"), b"{}").unwrap();
        assert!(!save_config(&config, &blocked));
    }

    #[test]
    fn test_scan_dir_skips_hidden_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("b.txt"), b"hello").unwrap();
        fs::write(tmp.path().join(".secret"), b"x").unwrap();
        fs::create_dir(tmp.path().join("a_dir")).unwrap();

        let entries = scan_dir(tmp.path(), false).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a_dir", "b.txt"]);
        assert!(entries[0].is_dir);
        assert_eq!(entries[0].formatted_size, "--");
        assert_eq!(entries[1].formatted_size, "5 B");

        assert_eq!(scan_dir(tmp.path(), true).unwrap().len(), 3);
    }
}
