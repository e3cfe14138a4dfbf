//! Tracing configuration for debugging reflection and constant resolution.
//!
//! Supports three output formats controlled by `REFRACT_LOG_FORMAT`:
//!
//! - `text` (default): Standard `tracing-subscriber` flat output
//! - `tree`: Hierarchical indented output via `tracing-tree`, which shows
//!   nested constant resolutions as nested spans
//! - `json`: One JSON object per span/event
//!
//! ## Quick start
//!
//! ```bash
//! # Follow a constant through its dependencies
//! REFRACT_LOG=refract_reflection=trace REFRACT_LOG_FORMAT=tree cargo test constant_cycle
//!
//! # Source cache hits and misses only
//! REFRACT_LOG=refract_binder::cache=debug cargo test
//! ```
//!
//! The subscriber is only initialised when `REFRACT_LOG` (or `RUST_LOG`) is
//! set, so library users who install their own subscriber are unaffected.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse a `REFRACT_LOG_FORMAT` value. Unknown values fall back to text.
    pub fn parse(value: &str) -> LogFormat {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => LogFormat::Tree,
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }

    fn from_env() -> LogFormat {
        LogFormat::parse(&std::env::var("REFRACT_LOG_FORMAT").unwrap_or_default())
    }
}

/// Build an `EnvFilter` from `REFRACT_LOG`, falling back to `RUST_LOG`.
///
/// `REFRACT_LOG` takes precedence when both are set. Values use the same
/// syntax as `RUST_LOG` (e.g. `debug`, `refract_reflection=trace`).
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("REFRACT_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `REFRACT_LOG` nor `RUST_LOG` is set, or when a
/// global subscriber is already installed. Output goes to stderr.
pub fn init_tracing() {
    let has_refract_log = std::env::var("REFRACT_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_refract_log && !has_rust_log {
        return;
    }

    let filter = build_filter();
    let installed = match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_writer(std::io::stderr)
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).try_init()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).try_init()
        }
        LogFormat::Text => {
            let text_layer = fmt::layer().with_writer(std::io::stderr);

            Registry::default().with(filter).with(text_layer).try_init()
        }
    };

    if installed.is_err() {
        tracing::debug!("global subscriber already installed; keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
    }
}
