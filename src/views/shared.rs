use comrak::plugins::syntect::SyntectAdapter;
use comrak::{ComrakOptions, ComrakPlugins, markdown_to_html_with_plugins};
use dioxus::prelude::*;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.footnotes = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.render.unsafe_ = true;
    options
});

pub fn markdown_to_html(md: &str) -> String {
    let adapter = SyntectAdapter::new(Some("base16-ocean.dark"));
    let mut plugins = ComrakPlugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&adapter);
    markdown_to_html_with_plugins(md, &MARKDOWN_OPTIONS, &plugins)
}

// ============================================
// Toasts
// ============================================

static TOAST_COUNTER: AtomicU64 = AtomicU64::new(1);

const SUCCESS_DISMISS: Duration = Duration::from_millis(4200);
const ERROR_DISMISS: Duration = Duration::from_millis(6500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub title: String,
    pub detail: String,
}

/// Push a toast and schedule its auto-dismiss.
pub fn push_toast(
    mut toasts: Signal<Vec<Toast>>,
    kind: ToastKind,
    title: impl Into<String>,
    detail: impl Into<String>,
) {
    let id = TOAST_COUNTER.fetch_add(1, Ordering::Relaxed);
    toasts.with_mut(|items| {
        items.push(Toast {
            id,
            kind,
            title: title.into(),
            detail: detail.into(),
        });
    });

    let delay = match kind {
        ToastKind::Success => SUCCESS_DISMISS,
        ToastKind::Error => ERROR_DISMISS,
    };
    spawn(async move {
        tokio::time::sleep(delay).await;
        toasts.with_mut(|items| items.retain(|toast| toast.id != id));
    });
}

pub fn toast_success(toasts: Signal<Vec<Toast>>, title: impl Into<String>, detail: impl Into<String>) {
    push_toast(toasts, ToastKind::Success, title, detail);
}

pub fn toast_error(toasts: Signal<Vec<Toast>>, title: impl Into<String>, detail: impl Into<String>) {
    push_toast(toasts, ToastKind::Error, title, detail);
}

// ============================================
// Formatting helpers
// ============================================

const KB_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:short] [day padding:zero], [year]");

pub fn format_created_date(timestamp: i64) -> String {
    if timestamp <= 0 {
        return "Unknown date".to_string();
    }

    let Ok(mut datetime) = OffsetDateTime::from_unix_timestamp(timestamp) else {
        return "Unknown date".to_string();
    };

    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }

    datetime
        .format(KB_DATE_FORMAT)
        .unwrap_or_else(|_| "Unknown date".to_string())
}

pub fn format_size(bytes: Option<u64>) -> String {
    let Some(n) = bytes else {
        return "-".to_string();
    };
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value > 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

pub fn format_score(score: f64) -> String {
    format!("{score:.3}")
}

/// Bare file name of a picked path (file engines may hand back full paths).
pub fn display_file_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .and_then(|stem| stem.to_str())
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{display_file_name, format_score, format_size};

    #[test]
    fn strips_directories_from_picked_paths() {
        assert_eq!(display_file_name("report.pdf"), "report.pdf");
        assert_eq!(display_file_name("/tmp/uploads/report.pdf"), "report.pdf");
    }

    #[test]
    fn formats_sizes() {
        assert_eq!(format_size(None), "-");
        assert_eq!(format_size(Some(512)), "512 B");
        assert_eq!(format_size(Some(2048)), "2.0 KB");
        assert_eq!(format_size(Some(5 * 1024 * 1024)), "5.0 MB");
    }

    #[test]
    fn formats_scores() {
        assert_eq!(format_score(0.82), "0.820");
        assert_eq!(format_score(0.0), "0.000");
    }
}
