//! `s4g new`: create a site folder with settings, theme and a home page.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::embed::theme;
use crate::log;
use crate::site::{ArticleMeta, PageType, SETTINGS_PATH, Settings, THEME_DIR};

const STARTER_PAGE: &str = "index.dj";

const STARTER_BODY: &str = "\
# Welcome

This is the home page. Edit `index.dj` and watch the browser reload.
";

pub fn new_site(folder: &Path) -> Result<()> {
    let settings_path = folder.join(SETTINGS_PATH);
    if settings_path.exists() {
        bail!("`{}` already exists, refusing to overwrite", settings_path.display());
    }
    log!("new"; "making new site at {}", folder.display());

    write_file(&settings_path, &Settings::starter().to_text())?;

    let theme_dir = folder.join(THEME_DIR);
    for (name, content) in theme::FILES {
        write_file(&theme_dir.join(name), content)?;
    }

    let page = folder.join(STARTER_PAGE);
    if !page.exists() {
        write_file(&page, &starter_page())?;
    }

    log!("new"; "done, run `s4g serve -f {}`", folder.display());
    Ok(())
}

fn starter_page() -> String {
    let meta = ArticleMeta {
        title: "Home".into(),
        page_type: PageType::Home,
        show_in_feed: false,
        ..ArticleMeta::default()
    };
    format!("{}---\n{STARTER_BODY}", meta.to_text())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::Site;
    use tempfile::TempDir;

    #[test]
    fn test_new_site_is_loadable() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("site1");

        new_site(&root).unwrap();

        assert!(root.join("_s4g/theme/base.tmpl").is_file());
        let site = Site::load(&root).unwrap();
        assert_eq!(site.settings.name, "This is my website");
        assert_eq!(site.articles.len(), 1);

        let home = &site.articles[0];
        assert_eq!(home.path, STARTER_PAGE);
        assert_eq!(home.meta.page_type, PageType::Home);
        assert!(!home.meta.show_in_feed);
        assert!(site.nav().is_ok());
    }

    #[test]
    fn test_refuses_existing_site() {
        let temp = TempDir::new().unwrap();
        new_site(temp.path()).unwrap();
        fs::write(temp.path().join(STARTER_PAGE), "---\nmine\n").unwrap();

        let err = new_site(temp.path()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(temp.path().join(STARTER_PAGE)).unwrap(), "---\nmine\n");
    }
}
