//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Where the site index is written and whether client scripts are patched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    /// Self-contained output: `articles.json` plus patched scripts
    #[default]
    Static,
    /// Output read by the preview server: `articles/index.json`, scripts untouched
    Server,
}

impl DeployMode {
    /// Index file path relative to the output directory
    pub fn index_path(&self) -> &'static str {
        match self {
            DeployMode::Static => "articles.json",
            DeployMode::Server => "articles/index.json",
        }
    }
}

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Directory
    pub articles_dir: String,
    pub public_dir: String,
    pub static_dirs: Vec<String>,
    pub static_files: Vec<String>,

    // Build
    pub deploy_mode: DeployMode,
    pub strict_patches: bool,

    // Index document
    pub site: SiteInfo,
    pub navigation: Vec<NavItem>,
    pub footer: FooterConfig,
    pub categories: Vec<CategoryConfig>,
    pub hero: HeroConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            articles_dir: "articles".to_string(),
            public_dir: "dist".to_string(),
            static_dirs: vec!["css".to_string(), "js".to_string()],
            static_files: vec![
                "index.html".to_string(),
                "articles.html".to_string(),
                "article-viewer.html".to_string(),
            ],

            deploy_mode: DeployMode::Static,
            strict_patches: false,

            site: SiteInfo::default(),
            navigation: vec![
                NavItem::new("Home", "index.html"),
                NavItem::new("Articles", "articles.html"),
            ],
            footer: FooterConfig::default(),
            categories: Vec::new(),
            hero: HeroConfig::default(),

            extra: IndexMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }
}

/// Site title, description and logo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    pub logo: LogoConfig,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Cosmic Insights".to_string(),
            description: "Exploring the wonders of the universe".to_string(),
            logo: LogoConfig::default(),
        }
    }
}

/// Logo text; scripts render `<span>prefix</span>suffix` when both are set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoConfig {
    pub text: String,
    pub prefix: String,
    pub suffix: String,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            text: "Cosmic Insights".to_string(),
            prefix: "Cosmic".to_string(),
            suffix: "Insights".to_string(),
        }
    }
}

/// Navigation entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NavItem {
    pub name: String,
    pub url: String,
}

impl NavItem {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Footer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterConfig {
    pub copyright: String,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            copyright: "© Cosmic Insights. All rights reserved.".to_string(),
        }
    }
}

/// Article category; `tag` is the filter key used by `articles.html?tag=`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CategoryConfig {
    pub name: String,
    pub tag: String,
}

/// Landing page hero section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    pub title: String,
    pub subtitle: String,
    pub cta: Vec<CtaButton>,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            title: "Explore the Universe".to_string(),
            subtitle: "Stories and science from across the cosmos".to_string(),
            cta: vec![CtaButton {
                text: "Read Articles".to_string(),
                url: "articles.html".to_string(),
                r#type: "primary".to_string(),
            }],
        }
    }
}

/// Call-to-action button in the hero section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CtaButton {
    pub text: String,
    pub url: String,
    pub r#type: String,
}
