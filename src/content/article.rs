//! Article metadata extraction

use chrono::{DateTime, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::FrontMatter;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_AUTHOR: &str = "Unknown";

lazy_static! {
    static ref TITLE_RE: Regex = Regex::new(r"(?m)^# ([^\r\n]*)").unwrap();
    static ref IMAGE_RE: Regex = Regex::new(r"!\[[^\]\n]*\]\(\s*([^)\s]*)[^)\n]*\)").unwrap();
    static ref AUTHOR_RE: Regex = marker("Author");
    static ref DATE_RE: Regex = marker("Date");
    static ref TAGS_RE: Regex = marker("Tags");
    // Single-asterisk span; `**bold**` runs never match
    static ref EXCERPT_RE: Regex =
        Regex::new(r"(?m)(?:^|[^*])\*([^*\s](?:[^*\n]*[^*\s])?)\*(?:[^*]|$)").unwrap();
}

/// `**<label>: value**` on a single line; `**Author:** value` is not a marker
fn marker(label: &str) -> Regex {
    Regex::new(&format!(r"\*\*{}:[ \t]+(.*?)\*\*", regex::escape(label))).unwrap()
}

/// Metadata for one markdown article, as written to the site index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// File name without extension
    pub id: String,
    pub filename: String,
    pub title: String,
    pub excerpt: String,
    pub image: String,
    /// Free-form; only checked by [`ArticleRecord::parse_date`]
    pub date: String,
    pub author: String,
    pub tags: Vec<String>,
}

impl ArticleRecord {
    /// Extract a record from raw markdown. Never fails: every field that
    /// cannot be found takes its default.
    pub fn extract(filename: &str, content: &str) -> Self {
        let (fm, body) = FrontMatter::parse(content);

        let title = fm
            .title
            .or_else(|| first_capture(&TITLE_RE, body))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let author = fm
            .author
            .or_else(|| first_capture(&AUTHOR_RE, body))
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        let tags = fm
            .tags
            .or_else(|| first_capture(&TAGS_RE, body).map(|raw| split_tags(&raw)))
            .unwrap_or_default();

        Self {
            id: article_id(filename),
            filename: filename.to_string(),
            title,
            excerpt: fm
                .excerpt
                .or_else(|| first_capture(&EXCERPT_RE, body))
                .unwrap_or_default(),
            image: fm
                .image
                .or_else(|| first_capture(&IMAGE_RE, body))
                .unwrap_or_default(),
            date: fm
                .date
                .or_else(|| first_capture(&DATE_RE, body))
                .unwrap_or_default(),
            author,
            tags,
        }
    }

    /// Try to read the date string as a calendar date
    pub fn parse_date(&self) -> Option<NaiveDate> {
        parse_date_string(&self.date)
    }
}

/// Split a comma-separated tag list, trimming entries and dropping empty ones
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// File name without its extension
fn article_id(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
        .to_string()
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Parse a date string in the formats articles actually use
fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let formats = ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];
    for fmt in formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
