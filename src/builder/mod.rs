//! Builder module - writes the deployable output tree

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::DeployMode;
use crate::content::loader::{ArticleLoader, SourceArticle};
use crate::content::{ArticleRecord, SiteIndex};
use crate::patch::{PatchReport, ScriptPatch};
use crate::Site;

/// Output directory for the copied markdown files
const ARTICLES_OUT_DIR: &str = "articles";

/// Summary of one build run
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub articles: Vec<ArticleRecord>,
    pub index_path: PathBuf,
    pub assets_copied: usize,
    pub patches: Vec<PatchReport>,
}

/// Static site builder
pub struct Builder {
    site: Site,
}

impl Builder {
    /// Create a new builder
    pub fn new(site: &Site) -> Self {
        Self { site: site.clone() }
    }

    /// Build the entire site
    pub fn build(&self) -> Result<BuildReport> {
        let public_dir = &self.site.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create output directory {:?}", public_dir))?;

        // Copy static assets first; the patch step works on the copies
        let assets_copied = self.copy_static_assets()?;

        let articles = ArticleLoader::new(&self.site.articles_dir).load_articles()?;
        tracing::info!("Loaded {} articles", articles.len());
        self.copy_articles(&articles)?;

        let records: Vec<ArticleRecord> = articles.into_iter().map(|a| a.record).collect();
        let index_path = public_dir.join(self.site.config.deploy_mode.index_path());
        SiteIndex::new(records.clone(), &self.site.config).write(&index_path)?;
        tracing::info!("Generated {:?}", index_path);

        let patches = match self.site.config.deploy_mode {
            DeployMode::Static => self.patch_scripts()?,
            DeployMode::Server => Vec::new(),
        };

        Ok(BuildReport {
            articles: records,
            index_path,
            assets_copied,
            patches,
        })
    }

    /// Copy each article verbatim to `<public>/articles/`
    fn copy_articles(&self, articles: &[SourceArticle]) -> Result<()> {
        let out_dir = self.site.public_dir.join(ARTICLES_OUT_DIR);
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create directory {:?}", out_dir))?;

        for article in articles {
            let dest = out_dir.join(&article.record.filename);
            fs::copy(&article.path, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", article.path, dest))?;
        }

        Ok(())
    }

    /// Copy configured directories (recursively) and top-level files
    fn copy_static_assets(&self) -> Result<usize> {
        let base_dir = &self.site.base_dir;
        let public_dir = &self.site.public_dir;
        let mut copied = 0;

        for dir in &self.site.config.static_dirs {
            copied += copy_dir(&base_dir.join(dir), &public_dir.join(dir))?;
        }

        for file in &self.site.config.static_files {
            let source = base_dir.join(file);
            let dest = public_dir.join(file);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&source, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", source, dest))?;
            copied += 1;
        }

        tracing::debug!("Copied {} static files", copied);
        Ok(copied)
    }

    /// Rewrite the API-backed scripts to read the generated index
    fn patch_scripts(&self) -> Result<Vec<PatchReport>> {
        let index_url = format!("/{}", DeployMode::Static.index_path());
        let mut reports = Vec::new();

        for patch in ScriptPatch::builtin(&index_url)? {
            if patch.is_optional() && !self.site.public_dir.join(&patch.target).is_file() {
                tracing::debug!("No {} in this site, skipping its patch", patch.target);
                continue;
            }
            let report = patch.apply(&self.site.public_dir)?;
            if self.site.config.strict_patches {
                report.clone().into_result()?;
            }
            reports.push(report);
        }

        Ok(reports)
    }
}

/// Recursively copy `source` into `dest`, overwriting existing files
fn copy_dir(source: &Path, dest: &Path) -> Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to read directory {:?}", source))?;
        let relative = entry.path().strip_prefix(source)?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory {:?}", target))?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {:?} to {:?}", entry.path(), target))?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::patch::PatchOutcome;
    use tempfile::TempDir;

    const ARTICLES_JS: &str = "const API_BASE_URL = 'http://localhost:3000/api';\n\
        const response = await fetch(`${API_BASE_URL}/site`);\n";

    const VIEWER_JS: &str = "const API_BASE_URL = 'http://localhost:3000/api';\n\
        const site = await fetch(`${API_BASE_URL}/site`);\n\
        const response = await fetch(`${API_BASE_URL}/articles/${filename}`);\n";

    /// Site root with the default asset layout and the given articles
    fn site_with(articles: &[(&str, &str)]) -> (TempDir, Site) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        fs::create_dir_all(root.join("articles")).unwrap();
        for (name, content) in articles {
            fs::write(root.join("articles").join(name), content).unwrap();
        }

        fs::create_dir_all(root.join("css/fonts")).unwrap();
        fs::write(root.join("css/style.css"), "body {}").unwrap();
        fs::write(root.join("css/fonts/star.woff"), "font").unwrap();
        fs::create_dir_all(root.join("js")).unwrap();
        fs::write(root.join("js/articles.js"), ARTICLES_JS).unwrap();
        fs::write(root.join("js/article-viewer.js"), VIEWER_JS).unwrap();
        for page in ["index.html", "articles.html", "article-viewer.html"] {
            fs::write(root.join(page), "<html></html>").unwrap();
        }

        let site = Site::new(root).unwrap();
        (tmp, site)
    }

    #[test]
    fn test_build_two_articles() {
        let a = "# Alpha\n**Author: X**\n**Date: 2024-01-01**\n**Tags: sky, stars**\n";
        let (_tmp, site) = site_with(&[("a.md", a), ("b.md", "")]);

        let report = Builder::new(&site).build().unwrap();
        let index = SiteIndex::load(&report.index_path).unwrap();

        assert_eq!(index.articles.len(), 2);
        let alpha = &index.articles[0];
        assert_eq!(alpha.id, "a");
        assert_eq!(alpha.title, "Alpha");
        assert_eq!(alpha.author, "X");
        assert_eq!(alpha.date, "2024-01-01");
        assert_eq!(alpha.tags, vec!["sky", "stars"]);

        let b = &index.articles[1];
        assert_eq!(b.id, "b");
        assert_eq!(b.title, "Untitled");
        assert_eq!(b.author, "Unknown");
        assert_eq!(b.excerpt, "");
        assert_eq!(b.image, "");
        assert_eq!(b.date, "");
        assert!(b.tags.is_empty());
    }

    #[test]
    fn test_readme_excluded_from_output() {
        let (_tmp, site) = site_with(&[
            ("README.md", "# Readme\n**Author: Maintainer**\n"),
            ("post1.md", "# First Light\n"),
        ]);

        let report = Builder::new(&site).build().unwrap();
        let out = &site.public_dir;

        assert!(out.join("articles/post1.md").exists());
        assert!(!out.join("articles/README.md").exists());
        assert_eq!(report.index_path, out.join("articles.json"));

        let index = SiteIndex::load(&report.index_path).unwrap();
        assert_eq!(index.articles.len(), 1);
        assert_eq!(index.articles[0].id, "post1");
    }

    #[test]
    fn test_articles_copied_verbatim() {
        let content = "# Verbatim\r\n\r\n*keep* every   byte\n";
        let (_tmp, site) = site_with(&[("v.md", content)]);
        Builder::new(&site).build().unwrap();
        let copied = fs::read_to_string(site.public_dir.join("articles/v.md")).unwrap();
        assert_eq!(copied, content);
    }

    #[test]
    fn test_latin1_article_does_not_abort_build() {
        let (_tmp, site) = site_with(&[("good.md", "# Good\n")]);
        let latin1: &[u8] = b"# Caf\xe9 under the stars\n";
        fs::write(site.articles_dir.join("latin1.md"), latin1).unwrap();

        let report = Builder::new(&site).build().unwrap();
        assert_eq!(report.articles.len(), 2);
        assert_eq!(report.articles[1].title, "Caf\u{fffd} under the stars");
        // The copy keeps the original bytes
        let copied = fs::read(site.public_dir.join("articles/latin1.md")).unwrap();
        assert_eq!(copied, latin1);
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let (_tmp, site) = site_with(&[
            ("one.md", "# One\n**Tags: a, b**\n"),
            ("two.md", "# Two\n*Excerpt*\n"),
        ]);

        let builder = Builder::new(&site);
        let first = builder.build().unwrap();
        let first_json = fs::read(&first.index_path).unwrap();
        let second = builder.build().unwrap();
        let second_json = fs::read(&second.index_path).unwrap();
        assert_eq!(first_json, second_json);
    }

    #[test]
    fn test_static_assets_copied() {
        let (_tmp, site) = site_with(&[]);
        let report = Builder::new(&site).build().unwrap();
        let out = &site.public_dir;

        assert!(out.join("css/style.css").exists());
        assert!(out.join("css/fonts/star.woff").exists());
        assert!(out.join("index.html").exists());
        assert!(out.join("article-viewer.html").exists());
        // 2 css + 2 js + 3 pages
        assert_eq!(report.assets_copied, 7);
    }

    #[test]
    fn test_static_mode_patches_scripts() {
        let (_tmp, site) = site_with(&[]);
        let report = Builder::new(&site).build().unwrap();

        assert_eq!(report.patches.len(), 2);
        assert!(report.patches.iter().all(|p| p.outcome.is_applied()));

        let articles_js = fs::read_to_string(site.public_dir.join("js/articles.js")).unwrap();
        assert!(!articles_js.contains("API_BASE_URL"));
        assert!(articles_js.contains("fetch('/articles.json')"));

        // Sources stay untouched
        let source_js = fs::read_to_string(site.base_dir.join("js/articles.js")).unwrap();
        assert_eq!(source_js, ARTICLES_JS);
    }

    #[test]
    fn test_home_script_patched_when_present() {
        let (_tmp, site) = site_with(&[]);
        let home = "const API_BASE_URL = 'http://localhost:3000/api';\n\
            const response = await fetch(`${API_BASE_URL}/site`);\n";
        fs::write(site.base_dir.join("js/index.js"), home).unwrap();

        let report = Builder::new(&site).build().unwrap();
        assert_eq!(report.patches.len(), 3);
        assert_eq!(report.patches[2].target, "js/index.js");
        assert!(report.patches[2].outcome.is_applied());

        let index_js = fs::read_to_string(site.public_dir.join("js/index.js")).unwrap();
        assert!(!index_js.contains("API_BASE_URL"));
        assert!(index_js.contains("fetch('/articles.json')"));
    }

    #[test]
    fn test_absent_home_script_is_not_reported() {
        let (_tmp, mut site) = site_with(&[]);
        site.config.strict_patches = true;

        let report = Builder::new(&site).build().unwrap();
        assert!(report.patches.iter().all(|p| p.target != "js/index.js"));
    }

    #[test]
    fn test_unmatched_patch_keeps_copy_unchanged() {
        let (_tmp, site) = site_with(&[]);
        let edited = "fetch('/somewhere-else');\n";
        fs::write(site.base_dir.join("js/articles.js"), edited).unwrap();

        let report = Builder::new(&site).build().unwrap();
        assert_eq!(
            report.patches[0].outcome,
            PatchOutcome::Unmatched {
                rule: "api-base-url".to_string()
            }
        );
        let copied = fs::read_to_string(site.public_dir.join("js/articles.js")).unwrap();
        assert_eq!(copied, edited);
    }

    #[test]
    fn test_strict_patches_fail_build() {
        let (_tmp, mut site) = site_with(&[]);
        fs::write(site.base_dir.join("js/articles.js"), "// hand edited\n").unwrap();
        site.config.strict_patches = true;

        let err = Builder::new(&site).build().unwrap_err();
        assert!(err.to_string().contains("found no match"));
    }

    #[test]
    fn test_server_mode_index_location() {
        let (_tmp, mut site) = site_with(&[("p.md", "# P")]);
        site.config.deploy_mode = DeployMode::Server;

        let report = Builder::new(&site).build().unwrap();
        assert_eq!(report.index_path, site.public_dir.join("articles/index.json"));
        assert!(report.patches.is_empty());
        assert!(!site.public_dir.join("articles.json").exists());

        let viewer = fs::read_to_string(site.public_dir.join("js/article-viewer.js")).unwrap();
        assert_eq!(viewer, VIEWER_JS);
    }

    #[test]
    fn test_missing_articles_dir_is_fatal() {
        let (_tmp, site) = site_with(&[]);
        fs::remove_dir_all(&site.articles_dir).unwrap();
        assert!(Builder::new(&site).build().is_err());
    }

    #[test]
    fn test_missing_static_dir_is_fatal() {
        let (_tmp, mut site) = site_with(&[]);
        site.config.static_dirs.push("images".to_string());
        let err = Builder::new(&site).build().unwrap_err();
        assert!(format!("{:#}", err).contains("images"));
    }

    #[test]
    fn test_index_carries_site_config() {
        let (_tmp, mut site) = site_with(&[]);
        site.config = SiteConfig {
            categories: vec![crate::config::CategoryConfig {
                name: "Planets".to_string(),
                tag: "planets".to_string(),
            }],
            ..site.config.clone()
        };

        let report = Builder::new(&site).build().unwrap();
        let index = SiteIndex::load(&report.index_path).unwrap();
        assert_eq!(index.categories[0].tag, "planets");
        assert_eq!(index.site.title, "Cosmic Insights");
    }
}
