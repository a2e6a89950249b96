//! Client script patching
//!
//! The page scripts are written against the development API
//! (`const API_BASE_URL = 'http://localhost:3000/api'`). A static deployment
//! has no API, so the copied scripts are rewritten to fetch the generated
//! index and the copied markdown files instead.
//!
//! A patch either applies completely or leaves the file untouched, and every
//! run reports what happened per file.

use anyhow::{Context, Result};
use regex::{NoExpand, Regex};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Strings that must not survive a successful patch
const LIVE_API_MARKERS: &[&str] = &["API_BASE_URL", "localhost:3000/api"];

/// A single search/replace step within a script patch
#[derive(Debug, Clone)]
pub struct PatchRule {
    pub name: &'static str,
    pattern: Regex,
    replacement: String,
    required: bool,
    replace_all: bool,
}

impl PatchRule {
    /// A rule that must match, otherwise the whole patch is abandoned
    pub fn required(name: &'static str, pattern: &str, replacement: &str) -> Result<Self> {
        Self::build(name, pattern, replacement, true)
    }

    /// A rule that is applied when it matches and ignored otherwise
    pub fn optional(name: &'static str, pattern: &str, replacement: &str) -> Result<Self> {
        Self::build(name, pattern, replacement, false)
    }

    /// Replace every match instead of only the first
    pub fn everywhere(mut self) -> Self {
        self.replace_all = true;
        self
    }

    fn build(name: &'static str, pattern: &str, replacement: &str, required: bool) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("Invalid pattern for patch rule {}", name))?;
        Ok(Self {
            name,
            pattern,
            replacement: replacement.to_string(),
            required,
            replace_all: false,
        })
    }

    fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    fn apply(&self, text: &str) -> String {
        // Replacements are JavaScript and contain `${...}`; never expand them
        let replacement = NoExpand(&self.replacement);
        if self.replace_all {
            self.pattern.replace_all(text, replacement).into_owned()
        } else {
            self.pattern.replace(text, replacement).into_owned()
        }
    }
}

/// What a patch did to its target file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// File rewritten; names of the rules that matched
    Applied { rules: Vec<String> },
    /// Target file does not exist
    Missing,
    /// A required rule found nothing; file left unchanged
    Unmatched { rule: String },
    /// Patched text would still reach the live API; file left unchanged
    Residual { marker: String },
}

impl PatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PatchOutcome::Applied { .. })
    }
}

impl fmt::Display for PatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchOutcome::Applied { rules } => write!(f, "applied ({})", rules.join(", ")),
            PatchOutcome::Missing => write!(f, "file not found"),
            PatchOutcome::Unmatched { rule } => write!(f, "rule '{}' found no match", rule),
            PatchOutcome::Residual { marker } => {
                write!(f, "result would still reference {}", marker)
            }
        }
    }
}

/// Raised for non-applied outcomes when patches are strict
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Script {target} not found")]
    Missing { target: String },

    #[error("Patch rule '{rule}' found no match in {target}")]
    Unmatched { target: String, rule: String },

    #[error("{target} would still reference {marker} after patching")]
    Residual { target: String, marker: String },
}

/// Per-file result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub target: String,
    pub outcome: PatchOutcome,
}

impl PatchReport {
    /// Turn a non-applied outcome into an error
    pub fn into_result(self) -> Result<(), PatchError> {
        let target = self.target;
        match self.outcome {
            PatchOutcome::Applied { .. } => Ok(()),
            PatchOutcome::Missing => Err(PatchError::Missing { target }),
            PatchOutcome::Unmatched { rule } => Err(PatchError::Unmatched { target, rule }),
            PatchOutcome::Residual { marker } => Err(PatchError::Residual { target, marker }),
        }
    }
}

/// An ordered set of rules for one script, path relative to the output root
#[derive(Debug, Clone)]
pub struct ScriptPatch {
    pub target: String,
    rules: Vec<PatchRule>,
    optional: bool,
}

impl ScriptPatch {
    pub fn new(target: &str, rules: Vec<PatchRule>) -> Self {
        Self {
            target: target.to_string(),
            rules,
            optional: false,
        }
    }

    /// Only patch the script when the site ships it
    pub fn if_present(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Patches for the API-backed page scripts. `index_url` is where the
    /// generated site index is served from, e.g. `/articles.json`.
    ///
    /// `js/articles.js` and `js/article-viewer.js` are expected in every
    /// site. The home page script `js/index.js` also loads the site
    /// configuration from the API, but not every site has one.
    pub fn builtin(index_url: &str) -> Result<Vec<Self>> {
        let site_fetch = format!("fetch('{}')", index_url);

        let articles = ScriptPatch::new(
            "js/articles.js",
            vec![
                PatchRule::required(
                    "api-base-url",
                    API_BASE_URL_DECL,
                    "// Static site version - no API needed",
                )?,
                PatchRule::required("site-fetch", SITE_FETCH, &site_fetch)?,
                PatchRule::optional(
                    "server-hint",
                    r"Please make sure the server is running\. ",
                    "",
                )?,
            ],
        );

        let viewer = ScriptPatch::new(
            "js/article-viewer.js",
            vec![
                PatchRule::required(
                    "api-base-url",
                    API_BASE_URL_DECL,
                    "// Static site version - no API needed",
                )?,
                PatchRule::required("site-fetch", SITE_FETCH, &site_fetch)?,
                PatchRule::required(
                    "article-fetch",
                    r"fetch\(`\$\{API_BASE_URL\}/articles/\$\{filename\}`\)",
                    "fetch(`/articles/${filename}`)",
                )?,
                PatchRule::optional(
                    "server-hint",
                    r" Please make sure the server is running\.",
                    "",
                )?
                .everywhere(),
            ],
        );

        let home = ScriptPatch::new(
            "js/index.js",
            vec![
                PatchRule::required(
                    "api-base-url",
                    API_BASE_URL_DECL,
                    "// Static site version - no API needed",
                )?,
                PatchRule::required("site-fetch", SITE_FETCH, &site_fetch)?,
                PatchRule::optional(
                    "server-hint",
                    r" Please make sure the server is running\.",
                    "",
                )?
                .everywhere(),
            ],
        )
        .if_present();

        Ok(vec![articles, viewer, home])
    }

    /// Run the rules over `text`. The returned text equals the input unless
    /// the outcome is `Applied`.
    pub fn patch_text(&self, text: &str) -> (PatchOutcome, String) {
        if let Some(rule) = self.rules.iter().find(|r| r.required && !r.is_match(text)) {
            return (
                PatchOutcome::Unmatched {
                    rule: rule.name.to_string(),
                },
                text.to_string(),
            );
        }

        let mut patched = text.to_string();
        let mut applied = Vec::new();
        for rule in &self.rules {
            if rule.is_match(&patched) {
                patched = rule.apply(&patched);
                applied.push(rule.name.to_string());
            }
        }

        if let Some(marker) = LIVE_API_MARKERS.iter().find(|m| patched.contains(**m)) {
            return (
                PatchOutcome::Residual {
                    marker: marker.to_string(),
                },
                text.to_string(),
            );
        }

        (PatchOutcome::Applied { rules: applied }, patched)
    }

    /// Patch the target file under `root` in place
    pub fn apply(&self, root: &Path) -> Result<PatchReport> {
        let path = root.join(&self.target);

        let outcome = if path.is_file() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read script {:?}", path))?;
            let (outcome, patched) = self.patch_text(&text);
            if outcome.is_applied() && patched != text {
                fs::write(&path, patched)
                    .with_context(|| format!("Failed to write script {:?}", path))?;
            }
            outcome
        } else {
            PatchOutcome::Missing
        };

        if outcome.is_applied() {
            tracing::info!("Patched {}: {}", self.target, outcome);
        } else {
            tracing::warn!("Left {} unchanged: {}", self.target, outcome);
        }

        Ok(PatchReport {
            target: self.target.clone(),
            outcome,
        })
    }
}

const API_BASE_URL_DECL: &str = r#"const API_BASE_URL\s*=\s*['"][^'"\n]*['"];?"#;
const SITE_FETCH: &str = r"fetch\(`\$\{API_BASE_URL\}/site`\)";
