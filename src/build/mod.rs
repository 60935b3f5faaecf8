//! Rebuild coordinator: one full regeneration pass over a site folder.
//!
//! A pass validates everything first (settings, articles, navigation,
//! redirect rules, templates) and renders every page in memory. Only then
//! are files written, stale outputs from the previous pass pruned and the
//! manifest updated. A content error therefore never writes or deletes
//! anything.

mod error;
pub mod manifest;

pub use error::BuildError;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::debug;
use crate::generator::page::{Layouts, SiteContext};
use crate::generator::redirect::{self, REDIRECTS_PATH, Redirect};
use crate::generator::{FEED_PATH, feed};
use crate::renderer::Render;
use crate::site::{Site, SiteError};
use crate::utils::date::DateTimeUtc;
use manifest::FileSet;

/// Summary of a successful pass.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Resolved web root, e.g. `/` or `/blog/`.
    pub root: String,
    pub pages: usize,
    pub feed_entries: usize,
    pub redirects: usize,
    pub pruned: usize,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn summary(&self) -> String {
        format!(
            "rebuilt {} pages, {} feed entries, {} redirects ({} pruned) in {}ms",
            self.pages,
            self.feed_entries,
            self.redirects,
            self.pruned,
            self.elapsed.as_millis()
        )
    }
}

/// Runs regeneration passes for one site with one renderer.
pub struct Rebuilder<R: Render> {
    site_dir: PathBuf,
    renderer: R,
}

impl<R: Render> Rebuilder<R> {
    pub fn new(site_dir: impl Into<PathBuf>, renderer: R) -> Self {
        Self {
            site_dir: site_dir.into(),
            renderer,
        }
    }

    pub fn site_dir(&self) -> &Path {
        &self.site_dir
    }

    /// One complete pass.
    pub fn run(&mut self) -> Result<BuildReport, BuildError> {
        let started = Instant::now();
        let dir = self.site_dir.as_path();

        let site = Site::load(dir)?;
        let nav = site.nav()?;
        let feed_list = site.feed();
        let redirects = redirect::load(dir)?;
        check_redirect_targets(&site, &redirects)?;

        let mut layouts = Layouts::new(dir);
        for article in &site.articles {
            layouts.preload(&article.template_paths)?;
        }

        let ctx = SiteContext {
            site: &site,
            nav: &nav,
            feed: &feed_list,
            now: DateTimeUtc::now(),
        };

        let mut outputs: Vec<(String, String)> = Vec::with_capacity(site.articles.len() + 1);
        for article in &site.articles {
            let content = self.renderer.render(&article.body)?;
            let mut vars = ctx.page_vars(article, content);
            let html = layouts.render(&article.template_paths, &mut vars)?;
            outputs.push((article.output_path.clone(), html));
        }
        let pages = outputs.len();

        if !feed_list.is_empty() {
            outputs.push((FEED_PATH.to_string(), feed::atom_xml(&site, &feed_list)));
        }
        for rule in &redirects {
            outputs.push((rule.src.clone(), rule.page(&site.settings.root)));
            debug!("build"; "redirect {} -> {}{}", rule.src, site.settings.root, rule.dest);
        }

        let previous = manifest::read(dir)?;
        let mut generated = FileSet::new();
        for (rel, content) in &outputs {
            write_output(dir, rel, content)?;
            generated.insert(rel.clone());
        }

        let pruned = manifest::prune(dir, &previous, &generated)?;
        for path in &pruned {
            debug!("build"; "pruned {}", path);
        }
        manifest::write(dir, &generated)?;

        Ok(BuildReport {
            root: site.settings.root.clone(),
            pages,
            feed_entries: feed_list.len(),
            redirects: redirects.len(),
            pruned: pruned.len(),
            elapsed: started.elapsed(),
        })
    }
}

/// A refresh page must not replace a page or the feed produced by the same
/// pass.
fn check_redirect_targets(site: &Site, redirects: &[Redirect]) -> Result<(), SiteError> {
    for rule in redirects {
        let owner = if rule.src == FEED_PATH {
            Some("the feed")
        } else {
            site.articles
                .iter()
                .find(|a| a.output_path == rule.src)
                .map(|a| a.path.as_str())
        };
        if let Some(owner) = owner {
            return Err(SiteError::new(
                REDIRECTS_PATH,
                format!("source \"{}\" is already generated by {}", rule.src, owner),
            )
            .with_line(rule.line));
        }
    }
    Ok(())
}

fn write_output(site_dir: &Path, rel: &str, content: &str) -> Result<(), BuildError> {
    let path = site_dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    fs::write(&path, content).map_err(|e| BuildError::io(path, e))
}

#[cfg(test)]
mod tests;
