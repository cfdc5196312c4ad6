//! Markdown test specs as read from disk
//!
//! A spec has a `## Preconditions` bullet list and a `## Steps` numbered
//! list. Template variables are left unrendered; the exporter recovers them
//! from the same text.

use std::path::{Path, PathBuf};

use autoqa_common::{MarkdownSpec, MarkdownSpecStep, StepKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// A numbered list item: `1. text` or `1) text`
pub(crate) static NUMBERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*(\d+)[.)][ \t]+(.+)$").expect("valid regex"));

static BULLET_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*[-*+][ \t]+(.+)$").expect("valid regex"));

const ASSERTION_PREFIXES: &[&str] = &["verify", "assert", "expect", "check", "验证", "断言", "检查"];

/// Body of the first `## <name>` section, up to the next `##` heading.
///
/// The heading match is case-insensitive and accepts trailing text, e.g.
/// `## Steps (happy path)`.
pub fn section<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    let mut start = None;
    let mut offset = 0;

    for line in raw.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(heading) = trimmed.strip_prefix("##") {
            if let Some(begin) = start {
                return Some(&raw[begin..offset]);
            }
            let title = heading.trim_start_matches('#').trim();
            if title.to_lowercase().starts_with(name) {
                start = Some(offset + line.len());
            }
        }
        offset += line.len();
    }

    start.map(|begin| &raw[begin..])
}

/// Whether a step reads as a check rather than an action
pub fn is_assertion(text: &str) -> bool {
    let lower = text.trim_start().to_lowercase();
    ASSERTION_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Build a [`MarkdownSpec`] from raw Markdown
pub fn parse_markdown_spec(raw: &str) -> MarkdownSpec {
    let preconditions = section(raw, "preconditions")
        .map(|body| {
            body.lines()
                .filter_map(|line| BULLET_ITEM.captures(line))
                .map(|cap| cap[1].trim().to_string())
                .collect()
        })
        .unwrap_or_default();

    let steps = section(raw, "steps")
        .map(|body| {
            body.lines()
                .filter_map(|line| NUMBERED_ITEM.captures(line))
                .filter_map(|cap| {
                    let index = cap[1].parse::<u32>().ok()?;
                    let text = cap[2].trim().to_string();
                    let kind = if is_assertion(&text) {
                        StepKind::Assertion
                    } else {
                        StepKind::Action
                    };
                    Some(MarkdownSpecStep { index, text, kind })
                })
                .collect()
        })
        .unwrap_or_default();

    MarkdownSpec {
        preconditions,
        steps,
    }
}

/// A spec file with its raw text and parsed steps
#[derive(Debug, Clone)]
pub struct SpecSource {
    pub path: PathBuf,
    pub raw: String,
    pub spec: MarkdownSpec,
}

impl SpecSource {
    pub fn from_markdown(path: impl Into<PathBuf>, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let spec = parse_markdown_spec(&raw);
        Self {
            path: path.into(),
            raw,
            spec,
        }
    }

    /// Read and parse a spec file
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_markdown(path, content))
    }

    /// Every `*.md` spec under `dir`, sorted by path
    pub fn load_all(dir: &Path) -> std::io::Result<Vec<Self>> {
        let mut paths = Vec::new();
        for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            let is_markdown = entry
                .path()
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("md"))
                .unwrap_or(false);
            if entry.file_type().is_file() && is_markdown {
                paths.push(entry.into_path());
            }
        }
        paths.sort();

        paths.iter().map(|p| Self::from_file(p)).collect()
    }
}
