//! Content module - article discovery and metadata extraction

mod article;
mod frontmatter;
mod index;
pub mod loader;

pub use article::{split_tags, ArticleRecord, DEFAULT_AUTHOR, DEFAULT_TITLE};
pub use frontmatter::FrontMatter;
pub use index::SiteIndex;
