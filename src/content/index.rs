//! Site index - the JSON document every page reads at runtime

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::ArticleRecord;
use crate::config::{CategoryConfig, FooterConfig, HeroConfig, NavItem, SiteConfig, SiteInfo};

/// All article records plus the site-wide settings the client scripts render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteIndex {
    pub articles: Vec<ArticleRecord>,
    pub site: SiteInfo,
    pub navigation: Vec<NavItem>,
    pub footer: FooterConfig,
    pub categories: Vec<CategoryConfig>,
    pub hero: HeroConfig,
}

impl SiteIndex {
    /// Combine extracted articles (kept in the given order) with site settings
    pub fn new(articles: Vec<ArticleRecord>, config: &SiteConfig) -> Self {
        Self {
            articles,
            site: config.site.clone(),
            navigation: config.navigation.clone(),
            footer: config.footer.clone(),
            categories: config.categories.clone(),
            hero: config.hero.clone(),
        }
    }

    /// Pretty JSON, 2-space indent, trailing newline
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Write the index, creating parent directories as needed
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write site index {:?}", path))?;
        Ok(())
    }

    /// Read a previously written index
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read site index {:?}", path))?;
        let index = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse site index {:?}", path))?;
        Ok(index)
    }
}
