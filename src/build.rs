//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the posts
//! ([`crate::parser`]), rendering index and post pages ([`crate::write`]),
//! copying the theme's static directory into the static output directory,
//! and generating the Atom feed.

use crate::config::Config;
use crate::feed::{write_feed, Error as FeedError, FeedConfig};
use crate::markdown::CommonMark;
use crate::parser::{Error as ParseError, Parser as PostParser};
use crate::repository::Catalog;
use crate::write::{Error as WriteError, Site, Writer};
use gtmpl::Template;
use log::{debug, info};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Parses the posts of the project described by `config`.
pub fn load_posts(config: &Config) -> Result<Catalog> {
    let renderer = CommonMark::default();
    let post_parser = PostParser::new(
        &config.index_url,
        &config.posts_url,
        &config.posts_output_directory,
        &renderer,
    );
    let catalog = post_parser.parse_posts(&config.posts_source_directory)?;
    info!(
        "Parsed {} posts from `{}`",
        catalog.len(),
        config.posts_source_directory.display()
    );
    Ok(catalog)
}

/// Builds the site from a [`Config`] object. This calls into [`load_posts`],
/// [`Writer::write_posts`], and [`write_feed`] which do the heavy-lifting.
/// This function also copies the static assets from the theme directory to
/// the output directory.
pub fn build_site(config: &Config) -> Result<()> {
    let catalog = load_posts(config)?;

    // Parse the template files.
    let index_template = parse_template(config.index_template.iter())?;
    let posts_template = parse_template(config.posts_template.iter())?;

    // Blow away the old output directories so we don't have any collisions.
    // The root output directory is left alone in case the user passes the
    // wrong directory.
    rmdir(&config.posts_output_directory)?;
    rmdir(&config.index_output_directory)?;
    rmdir(&config.static_output_directory)?;

    // write the post and index pages
    let writer = Writer {
        repository: &catalog,
        posts_template: &posts_template,
        index_template: &index_template,
        index_url: &config.index_url,
        index_output_directory: &config.index_output_directory,
        index_page_size: config.index_page_size,
        pagination_window: config.pagination_window,
        recent_posts: config.recent_posts,
        site: Site {
            title: &config.title,
            description: &config.description,
            home_page: &config.home_page,
            static_url: &config.static_url,
            feed_url: &config.feed_url,
        },
    };
    writer.write_posts()?;

    if config.static_source_directory.is_dir() {
        copy_dir(
            &config.static_source_directory,
            &config.static_output_directory,
        )?;
    }

    // copy /pages/index.html to /index.html
    std::fs::copy(
        config.index_output_directory.join("index.html"),
        config.root_output_directory.join("index.html"),
    )?;

    // create the atom feed
    write_feed(
        &FeedConfig {
            title: config.title.clone(),
            subtitle: config.description.clone(),
            id: config.site_root.to_string(),
            author: config.author.clone(),
            home_page: config.home_page.clone(),
            feed_url: config.feed_url.clone(),
        },
        &catalog,
        File::create(config.root_output_directory.join("feed.atom"))?,
    )?;

    info!(
        "Built site into `{}`",
        config.root_output_directory.display()
    );
    Ok(())
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry?;
        // every entry is below `src`
        let target = match entry.path().strip_prefix(src) {
            Ok(relative) => dst.join(relative),
            Err(_) => continue,
        };
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            debug!("Copying `{}`", entry.path().display());
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

// Loads the template file contents, concatenates them, and parses the result
// into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, writing,
/// cleaning output directories, parsing template files, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors writing [`crate::post::Post`]s to disk as HTML files.
    Write(WriteError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors walking the static directory.
    WalkDir(walkdir::Error),

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::WalkDir(err) => Some(err),
            Error::Feed(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn project(root: &Path) -> std::io::Result<()> {
        fs::create_dir_all(root.join("posts"))?;
        fs::create_dir_all(root.join("theme/static/css"))?;
        fs::write(
            root.join(crate::config::PROJECT_FILE),
            "title: Test Blog\nsite_root: https://example.org/\nindex_page_size: 1\n",
        )?;
        fs::write(
            root.join("theme/theme.yaml"),
            "index_template: [index.html]\nposts_template: [post.html]\n",
        )?;
        fs::write(
            root.join("theme/index.html"),
            "{{ range .item }}{{ .title }};{{ end }}{{ with .pagination }}{{ .total_pages }}{{ end }}",
        )?;
        fs::write(root.join("theme/post.html"), "{{ .item.body }}")?;
        fs::write(root.join("theme/static/css/style.css"), "body {}")?;
        for (id, date) in &[("first", "2021-01-01"), ("second", "2021-02-01")] {
            fs::write(
                root.join("posts").join(format!("{}.md", id)),
                format!(
                    "---\nTitle: {}\nDate: {}\nCategory: Notes\n---\nHello from {}.\n",
                    id, date, id
                ),
            )?;
        }
        Ok(())
    }

    #[test]
    fn test_build_site() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let root = tempdir()?;
        let out = tempdir()?;
        project(root.path())?;
        let config = Config::from_directory(root.path(), out.path())?;
        build_site(&config)?;

        // each template file is followed by a space when concatenated
        assert_eq!(
            "second;2 ",
            fs::read_to_string(out.path().join("index.html"))?
        );
        assert_eq!(
            "first;2 ",
            fs::read_to_string(out.path().join("pages/2.html"))?
        );
        assert_eq!(
            "<p>Hello from first.</p> ",
            fs::read_to_string(out.path().join("posts/first.html"))?
        );
        assert!(out.path().join("static/css/style.css").is_file());
        assert!(fs::read_to_string(out.path().join("feed.atom"))?.contains("[Notes] second"));
        Ok(())
    }

    #[test]
    fn test_missing_template() {
        let err = parse_template(vec![PathBuf::from("/does/not/exist.html")].into_iter());
        assert!(matches!(err, Err(Error::OpenTemplateFile { .. })));
    }
}
