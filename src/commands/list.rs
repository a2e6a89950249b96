//! List site content

use anyhow::Result;
use std::collections::HashMap;
use std::fmt::Write;

use crate::content::loader::ArticleLoader;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    print!("{}", render(site, content_type)?);
    Ok(())
}

/// Listing text for `article` or `tag`
pub fn render(site: &Site, content_type: &str) -> Result<String> {
    let loader = ArticleLoader::new(&site.articles_dir);
    let mut out = String::new();

    match content_type {
        "article" | "articles" => {
            let articles = loader.load_articles()?;
            writeln!(out, "Articles ({}):", articles.len())?;
            for article in articles {
                let record = article.record;
                let date = if record.date.is_empty() {
                    "----------".to_string()
                } else {
                    record.date
                };
                writeln!(
                    out,
                    "  {} - {} by {} [{}]",
                    date, record.title, record.author, record.filename
                )?;
            }
        }
        "tag" | "tags" => {
            let articles = loader.load_articles()?;
            let mut tags: HashMap<String, usize> = HashMap::new();
            for article in &articles {
                for tag in &article.record.tags {
                    *tags.entry(tag.clone()).or_insert(0) += 1;
                }
            }
            writeln!(out, "Tags ({}):", tags.len())?;
            let mut tags: Vec<_> = tags.into_iter().collect();
            tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            for (tag, count) in tags {
                writeln!(out, "  {} ({})", tag, count)?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: article, tag",
                content_type
            );
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn site() -> (tempfile::TempDir, Site) {
        let tmp = tempfile::tempdir().unwrap();
        let articles = tmp.path().join("articles");
        fs::create_dir_all(&articles).unwrap();
        fs::write(
            articles.join("comets.md"),
            "# Comets\n**Author: Halley**\n**Date: 2024-05-01**\n**Tags: comets, sky**\n",
        )
        .unwrap();
        fs::write(articles.join("moon.md"), "# Moon\n**Tags: sky**\n").unwrap();
        let site = Site::new(tmp.path()).unwrap();
        (tmp, site)
    }

    #[test]
    fn test_list_articles() {
        let (_tmp, site) = site();
        let out = render(&site, "article").unwrap();
        assert!(out.starts_with("Articles (2):"));
        assert!(out.contains("2024-05-01 - Comets by Halley [comets.md]"));
        assert!(out.contains("---------- - Moon by Unknown [moon.md]"));
    }

    #[test]
    fn test_list_tags_by_count() {
        let (_tmp, site) = site();
        let out = render(&site, "tags").unwrap();
        assert_eq!(out, "Tags (2):\n  sky (2)\n  comets (1)\n");
    }

    #[test]
    fn test_unknown_type() {
        let (_tmp, site) = site();
        assert!(render(&site, "page").is_err());
    }
}
