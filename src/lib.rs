//! cosmic-press: static site builder for the Cosmic Insights blog
//!
//! Turns a directory of markdown articles into a deployable tree: copied
//! assets, copied articles, a JSON site index, and page scripts patched to
//! read that index instead of the development API.

pub mod builder;
pub mod commands;
pub mod config;
pub mod content;
pub mod patch;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A site rooted at a directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Markdown articles directory
    pub articles_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Create a new site from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a site with an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let articles_dir = base_dir.join(&config.articles_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            articles_dir,
            public_dir,
        }
    }

    /// Build the static site
    pub fn build(&self) -> Result<builder::BuildReport> {
        commands::build::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Where the site index lives in the output tree
    pub fn index_path(&self) -> PathBuf {
        self.public_dir.join(self.config.deploy_mode.index_path())
    }
}
