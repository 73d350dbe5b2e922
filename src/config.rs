//! Loads the project configuration from `folio.yaml` and the theme
//! configuration from `theme/theme.yaml`, and derives every URL and
//! directory the build needs from them.

use crate::pagination::DEFAULT_WINDOW;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "folio.yaml";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

#[derive(Deserialize)]
struct Window(usize);
impl Default for Window {
    fn default() -> Self {
        Window(DEFAULT_WINDOW)
    }
}

fn default_home_page() -> String {
    String::from("pages/index.html")
}

fn default_recent_posts() -> usize {
    5
}

/// The author of the site, credited in the feed.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct Project {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub author: Option<Author>,

    pub site_root: Url,

    #[serde(default = "default_home_page")]
    pub home_page: String,

    #[serde(default)]
    pub index_page_size: PageSize,

    #[serde(default)]
    pub pagination_window: Window,

    #[serde(default = "default_recent_posts")]
    pub recent_posts: usize,
}

fn default_static_directory() -> PathBuf {
    PathBuf::from("static")
}

#[derive(Deserialize)]
struct Theme {
    index_template: Vec<PathBuf>,
    posts_template: Vec<PathBuf>,

    #[serde(default = "default_static_directory", rename = "static")]
    static_directory: PathBuf,
}

/// Everything a build needs to know.
#[derive(Debug)]
pub struct Config {
    pub title: String,
    pub description: String,
    pub author: Option<Author>,

    /// The URL of the site root. Always ends with a slash.
    pub site_root: Url,
    pub home_page: Url,
    pub index_url: Url,
    pub posts_url: Url,
    pub static_url: Url,
    pub feed_url: Url,

    pub posts_source_directory: PathBuf,
    pub static_source_directory: PathBuf,
    pub index_template: Vec<PathBuf>,
    pub posts_template: Vec<PathBuf>,

    pub root_output_directory: PathBuf,
    pub index_output_directory: PathBuf,
    pub posts_output_directory: PathBuf,
    pub static_output_directory: PathBuf,

    /// The number of posts per index page.
    pub index_page_size: usize,

    /// The number of page links on either side of the current page.
    pub pagination_window: usize,

    /// The number of posts listed in the sidebar's recent posts.
    pub recent_posts: usize,
}

impl Config {
    /// Searches `dir` and its ancestors for a [`PROJECT_FILE`] and loads it.
    /// See [`Config::from_project_file`].
    pub fn from_directory(dir: &Path, output_directory: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
                .with_context(|| format!("Loading configuration from `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    /// Loads the project file at `path`. The project root is the file's
    /// directory: posts are read from `{root}/posts` and the theme from
    /// `{root}/theme`. `output_directory` is where the site is written.
    pub fn from_project_file(path: &Path, output_directory: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)
            .with_context(|| format!("Parsing project file `{}`", path.display()))?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;

        let theme_dir = project_root.join("theme");
        let theme_path = theme_dir.join("theme.yaml");
        let theme: Theme = serde_yaml::from_reader(open(&theme_path, "theme")?)
            .with_context(|| format!("Parsing theme file `{}`", theme_path.display()))?;

        if project.index_page_size.0 < 1 {
            bail!("`index_page_size` must be at least 1");
        }

        let site_root = with_trailing_slash(project.site_root);
        Ok(Config {
            title: project.title,
            description: project.description,
            author: project.author,
            home_page: site_root.join(&project.home_page)?,
            index_url: site_root.join("pages/")?,
            posts_url: site_root.join("posts/")?,
            static_url: site_root.join("static/")?,
            feed_url: site_root.join("feed.atom")?,
            site_root,
            posts_source_directory: project_root.join("posts"),
            static_source_directory: theme_dir.join(&theme.static_directory),
            index_template: theme
                .index_template
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            posts_template: theme
                .posts_template
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            root_output_directory: output_directory.to_owned(),
            index_output_directory: output_directory.join("pages"),
            posts_output_directory: output_directory.join("posts"),
            static_output_directory: output_directory.join("static"),
            index_page_size: project.index_page_size.0,
            pagination_window: project.pagination_window.0,
            recent_posts: project.recent_posts,
        })
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn open(path: &Path, kind: &str) -> Result<File> {
    File::open(path).with_context(|| format!("Opening {} file `{}`", kind, path.display()))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const THEME: &str = "index_template: [base.html, index.html]\nposts_template: [base.html, post.html]\n";

    #[test]
    fn test_from_directory_searches_ancestors() -> Result<()> {
        let root = tempdir()?;
        fs::create_dir_all(root.path().join("theme"))?;
        fs::create_dir_all(root.path().join("posts/drafts"))?;
        fs::write(
            root.path().join(PROJECT_FILE),
            "title: My Blog\nsite_root: https://example.org/blog\nindex_page_size: 3\n",
        )?;
        fs::write(root.path().join("theme/theme.yaml"), THEME)?;

        let config =
            Config::from_directory(&root.path().join("posts/drafts"), Path::new("/tmp/out"))?;
        assert_eq!("My Blog", config.title);
        assert_eq!("https://example.org/blog/", config.site_root.as_str());
        assert_eq!("https://example.org/blog/pages/", config.index_url.as_str());
        assert_eq!(
            "https://example.org/blog/pages/index.html",
            config.home_page.as_str()
        );
        assert_eq!(3, config.index_page_size);
        assert_eq!(DEFAULT_WINDOW, config.pagination_window);
        assert_eq!(5, config.recent_posts);
        assert_eq!(root.path().join("posts"), config.posts_source_directory);
        assert_eq!(root.path().join("theme/static"), config.static_source_directory);
        assert_eq!(
            vec![
                root.path().join("theme/base.html"),
                root.path().join("theme/index.html")
            ],
            config.index_template
        );
        assert_eq!(PathBuf::from("/tmp/out/pages"), config.index_output_directory);
        Ok(())
    }

    #[test]
    fn test_rejects_zero_page_size() -> Result<()> {
        let root = tempdir()?;
        fs::create_dir_all(root.path().join("theme"))?;
        fs::write(
            root.path().join(PROJECT_FILE),
            "title: t\nsite_root: https://example.org/\nindex_page_size: 0\n",
        )?;
        fs::write(root.path().join("theme/theme.yaml"), THEME)?;
        let err = Config::from_directory(root.path(), Path::new("/tmp/out")).unwrap_err();
        assert!(format!("{:#}", err).contains("index_page_size"));
        Ok(())
    }

    #[test]
    fn test_missing_theme() -> Result<()> {
        let root = tempdir()?;
        fs::write(
            root.path().join(PROJECT_FILE),
            "title: t\nsite_root: https://example.org/\n",
        )?;
        let err = Config::from_directory(root.path(), Path::new("/tmp/out")).unwrap_err();
        assert!(format!("{:#}", err).contains("Opening theme file"));
        Ok(())
    }
}
