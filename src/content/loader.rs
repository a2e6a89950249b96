//! Article loader - discovers and reads articles from the articles directory

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::ArticleRecord;

/// Repository readme that lives beside the articles but is never one
const README: &str = "README.md";

/// One discovered article: where it lives and what was extracted from it
#[derive(Debug, Clone)]
pub struct SourceArticle {
    pub path: PathBuf,
    pub record: ArticleRecord,
}

/// Loads articles from a single directory (not recursive)
pub struct ArticleLoader {
    articles_dir: PathBuf,
}

impl ArticleLoader {
    /// Create a new article loader
    pub fn new<P: AsRef<Path>>(articles_dir: P) -> Self {
        Self {
            articles_dir: articles_dir.as_ref().to_path_buf(),
        }
    }

    /// List article files in file-name order. The whole listing completes
    /// before any file is read.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();

        for entry in WalkDir::new(&self.articles_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.with_context(|| {
                format!("Failed to list articles in {:?}", self.articles_dir)
            })?;
            let path = entry.path();
            if entry.file_type().is_file() && is_article_file(path) {
                paths.push(path.to_path_buf());
            } else {
                tracing::debug!("Skipping {:?}", path);
            }
        }

        Ok(paths)
    }

    /// Discover and extract every article
    pub fn load_articles(&self) -> Result<Vec<SourceArticle>> {
        self.discover()?
            .into_iter()
            .map(|path| self.load_article(&path))
            .collect()
    }

    /// Read a single article and extract its record
    pub fn load_article(&self, path: &Path) -> Result<SourceArticle> {
        let bytes = fs::read(path).with_context(|| format!("Failed to read article {:?}", path))?;
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Article {:?} is not valid UTF-8, decoding lossily", path);
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let record = ArticleRecord::extract(&filename, &content);
        tracing::debug!("Extracted {:?} from {:?}", record.title, path);

        if !record.date.is_empty() && record.parse_date().is_none() {
            tracing::warn!(
                "Article {} has a date that does not look like one: {:?}",
                record.filename,
                record.date
            );
        }

        Ok(SourceArticle {
            path: path.to_path_buf(),
            record,
        })
    }
}

/// `*.md`, except the directory readme
fn is_article_file(path: &Path) -> bool {
    let is_markdown = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md")
        .unwrap_or(false);
    let is_readme = path
        .file_name()
        .map(|n| n == README)
        .unwrap_or(false);
    is_markdown && !is_readme
}
