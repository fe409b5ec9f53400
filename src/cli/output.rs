//! Terminal rendering for listings, results and progress.

use fmclient::models::{FileSystemEntry, OperationOutcome, ProgressState, ProgressStatus};
use fmclient::navigator::{EntryRow, NavigatorState};
use indicatif::{ProgressBar, ProgressStyle};

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;
const TB: u64 = GB * 1024;

pub fn format_size(bytes: u64) -> String {
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes < TB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    }
}

/// "3 days ago" for an epoch-millisecond timestamp, relative to `now_secs`.
pub fn format_modified(millis: i64, now_secs: i64) -> String {
    let diff = now_secs - millis / 1000;
    let plural = |n: i64| if n == 1 { "" } else { "s" };

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        let mins = diff / 60;
        format!("{} minute{} ago", mins, plural(mins))
    } else if diff < 86400 {
        let hours = diff / 3600;
        format!("{} hour{} ago", hours, plural(hours))
    } else if diff < 2_592_000 {
        let days = diff / 86400;
        format!("{} day{} ago", days, plural(days))
    } else {
        chrono::DateTime::from_timestamp_millis(millis)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

fn row_markers(row: &EntryRow) -> &'static str {
    if row.inaccessible {
        "  (no access)"
    } else if row.read_only {
        "  (read-only)"
    } else {
        ""
    }
}

/// One line per entry: icon, name, markers, then size and age for files.
pub fn entry_line(entry: &FileSystemEntry, now_secs: i64) -> String {
    let row = EntryRow::from_entry(entry);
    let mut line = format!("{} {}{}", row.icon.glyph(), row.label, row_markers(&row));
    if !entry.directory {
        if let Some(size) = entry.size {
            line.push_str(&format!("  {}", format_size(size)));
        }
        if let Some(modified) = entry.last_modified {
            line.push_str(&format!("  {}", format_modified(modified, now_secs)));
        }
    }
    line
}

pub fn print_entries(entries: &[FileSystemEntry]) {
    let now = chrono::Utc::now().timestamp();
    for entry in entries {
        println!("  {}", entry_line(entry, now));
    }
}

/// Navigator screen: breadcrumbs, numbered rows, manual path status.
pub fn print_navigator(state: &NavigatorState) {
    let crumbs: Vec<String> = state
        .breadcrumbs()
        .iter()
        .enumerate()
        .map(|(i, c)| format!("[{i}] {}", c.label))
        .collect();
    println!();
    println!("{}", crumbs.join(" > "));
    if state.is_roots_view() {
        println!("  (filesystem roots)");
    }

    let now = chrono::Utc::now().timestamp();
    for (i, entry) in state.entries.iter().enumerate() {
        let row = EntryRow::from_entry(entry);
        let marker = if row.clickable { format!("{:>3}", i + 1) } else { "   ".to_string() };
        println!("{marker}  {}", entry_line(entry, now));
    }
    if state.entries.is_empty() && !state.loading {
        println!("  (empty)");
    }

    if let Some(error) = &state.error {
        println!("  Error: {error}");
    }
    if let Some(hint) = state.manual_path_hint() {
        println!("  {}: {hint}", state.manual_path_input.trim());
    }
}

pub fn print_outcome<R: OperationOutcome>(title: &str, outcome: &R) {
    let mark = if outcome.success() { "✓" } else { "✗" };
    println!("{mark} {title}: {}", outcome.message());
    println!("  {}: {}", outcome.count_label(), outcome.count());
}

pub fn new_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Mirror a progress state onto a bar.
pub fn render_progress(pb: &ProgressBar, state: &ProgressState) {
    match state.percentage {
        Some(pct) => pb.set_position(u64::from(pct)),
        None => pb.tick(),
    }
    let mut msg = state.message.clone().unwrap_or_default();
    if let (Some(current), Some(total)) = (state.current, state.total) {
        msg = format!("{msg} ({current}/{total})");
    }
    if let Some(detail) = &state.detail {
        msg = format!("{msg} {detail}");
    }
    pb.set_message(msg.trim().to_string());

    match state.status {
        Some(ProgressStatus::Completed) => pb.finish(),
        Some(ProgressStatus::Error) => {
            pb.abandon_with_message(state.error.clone().unwrap_or_default())
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * MB), "5.0 MB");
        assert_eq!(format_size(3 * GB), "3.00 GB");
    }

    #[test]
    fn test_format_modified() {
        let now = 1_700_000_000;
        assert_eq!(format_modified(now * 1000, now), "just now");
        assert_eq!(format_modified((now - 120) * 1000, now), "2 minutes ago");
        assert_eq!(format_modified((now - 3600) * 1000, now), "1 hour ago");
        assert_eq!(format_modified((now - 3 * 86400) * 1000, now), "3 days ago");
        assert_eq!(format_modified(0, now), "1970-01-01");
    }

    #[test]
    fn test_entry_line_for_file() {
        let entry = FileSystemEntry {
            path: "/srv/a.jpg".to_string(),
            name: "a.jpg".to_string(),
            directory: false,
            parent: false,
            readable: true,
            writable: false,
            size: Some(2048),
            last_modified: None,
        };
        assert_eq!(entry_line(&entry, 0), "📄 a.jpg  (read-only)  2.0 KB");
    }
}
