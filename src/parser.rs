//! Defines the [`Parser`] and [`Error`] types: the logic for parsing posts
//! from the file system into memory.

use std::{
    collections::HashSet,
    fmt,
    fs::{read_dir, File},
    path::{Path, PathBuf},
};

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use serde::Deserialize;
use url::Url;

use crate::{
    markdown::{self, MarkupRenderer},
    post::{Post, EXCERPT_LENGTH},
    repository::Catalog,
    tag::{Category, Tag},
};

const MARKDOWN_EXTENSION: &str = "md";

/// Parses [`Post`] objects from source files.
pub struct Parser<'a, R> {
    /// `index_url` is the base URL for index pages. It's used to prefix
    /// category and tag page URLs (i.e., the URL for the first page of a tag
    /// is `{index_url}/tag/{slug}/index.html`). Must end with a slash.
    index_url: &'a Url,

    /// `posts_url` is the base URL for post pages (i.e., the URL for a post
    /// is `{posts_url}/{post_id}.html`). Must end with a slash.
    posts_url: &'a Url,

    /// `posts_directory` is the directory in which post pages will be
    /// rendered.
    posts_directory: &'a Path,

    /// Renders the post bodies.
    renderer: &'a R,
}

impl<'a, R: MarkupRenderer> Parser<'a, R> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(
        index_url: &'a Url,
        posts_url: &'a Url,
        posts_directory: &'a Path,
        renderer: &'a R,
    ) -> Parser<'a, R> {
        Parser {
            index_url,
            posts_url,
            posts_directory,
            renderer,
        }
    }

    /// Parses a single [`Post`] with id `id` from the contents of its source
    /// file.
    pub fn parse_post(&self, id: &str, input: &str) -> Result<Post> {
        fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
            const FENCE: &str = "---";
            if !input.starts_with(FENCE) {
                return Err(Error::FrontmatterMissingStartFence);
            }
            match input[FENCE.len()..].find(FENCE) {
                None => Err(Error::FrontmatterMissingEndFence),
                Some(offset) => Ok((
                    FENCE.len(),                        // yaml_start
                    FENCE.len() + offset,               // yaml_stop
                    FENCE.len() + offset + FENCE.len(), // body_start
                )),
            }
        }

        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

        let file_name = format!("{}.html", id);
        let url = self.posts_url.join(&file_name)?;
        let rendered = self
            .renderer
            .render(&input[body_start..], url.as_str())?;

        let created = parse_date(&frontmatter.date)?;
        let modified = match &frontmatter.modified {
            Some(modified) => parse_date(modified)?,
            None => created,
        };

        let (excerpt, truncated) = match frontmatter.excerpt {
            Some(excerpt) if !excerpt.trim().is_empty() => (excerpt, false),
            _ => (
                Post::excerpt_from(&rendered.text),
                rendered.text.chars().count() > EXCERPT_LENGTH,
            ),
        };

        Ok(Post {
            id: id.to_owned(),
            file_path: self.posts_directory.join(&file_name),
            url,
            title: frontmatter.title,
            created,
            modified,
            excerpt,
            truncated,
            category: Category::new(&frontmatter.category, self.index_url)?,
            tags: frontmatter
                .tags
                .iter()
                .map(|t| Tag::new(t, self.index_url))
                .collect::<std::result::Result<HashSet<Tag>, url::ParseError>>()?,
            author: frontmatter.author,
            body: rendered.html,
            text: rendered.text,
            toc: rendered.toc,
        })
    }

    fn parse_file(&self, path: &Path) -> Result<Post> {
        let id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| InvalidFileNameError(path.to_owned()))?;

        use std::io::Read;
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;

        debug!("Parsing post `{}`", path.display());
        match self.parse_post(id, &contents) {
            Ok(post) => Ok(post),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", path.display()),
                Box::new(e),
            )),
        }
    }

    /// Searches a provided `source_directory` for post files (extension =
    /// `.md`) and returns a [`Catalog`] of the posts, most recent first.
    /// Each post file must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with fields `Title`, `Date`, `Category`, and
    ///    optionally `Modified`, `Tags`, `Author` and `Excerpt`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// Title: Hello, world!
    /// Date: 2021-04-16
    /// Category: Notes
    /// Tags: [greet]
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Catalog> {
        let mut posts = Vec::new();
        for result in read_dir(source_directory)? {
            let path = result?.path();
            if path.is_file() && path.extension().map_or(false, |e| e == MARKDOWN_EXTENSION) {
                posts.push(self.parse_file(&path)?);
            }
        }
        Ok(Catalog::new(posts))
    }
}

/// Parses `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` dates.
fn parse_date(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();
    NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d").map(|d| d.and_hms(0, 0, 0)))
        .map_err(|err| Error::Date(input.to_owned(), err))
}

#[derive(Deserialize, Clone)]
struct Frontmatter {
    /// The title of the post.
    #[serde(rename = "Title")]
    pub title: String,

    /// The creation date of the post.
    #[serde(rename = "Date")]
    pub date: String,

    /// The last modification date of the post.
    #[serde(default, rename = "Modified")]
    pub modified: Option<String>,

    /// The category of the post.
    #[serde(rename = "Category")]
    pub category: String,

    /// The tags associated with the post.
    #[serde(default, rename = "Tags")]
    pub tags: HashSet<String>,

    /// The author of the post.
    #[serde(default, rename = "Author")]
    pub author: Option<String>,

    /// A hand-written excerpt.
    #[serde(default, rename = "Excerpt")]
    pub excerpt: Option<String>,
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when a frontmatter date matches neither accepted format.
    Date(String, chrono::ParseError),

    /// Returned when there is a problem parsing URLs.
    UrlParse(url::ParseError),

    /// Returned when the post body can't be rendered.
    Markdown(markdown::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned when a source file name isn't valid UTF-8.
    InvalidFileName(InvalidFileNameError),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::Date(input, err) => write!(f, "invalid date `{}`: {}", input, err),
            Error::UrlParse(err) => err.fmt(f),
            Error::Markdown(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::InvalidFileName(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::Date(_, err) => Some(err),
            Error::UrlParse(err) => Some(err),
            Error::Markdown(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::InvalidFileName(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

impl From<markdown::Error> for Error {
    fn from(err: markdown::Error) -> Error {
        Error::Markdown(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing and joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::markdown::CommonMark;
    use crate::repository::PostRepository;
    use tempfile::tempdir;

    const HELLO: &str = "---
Title: Hello, world!
Date: 2021-04-16
Category: Notes
Tags: [greet, Greet, intro]
---
# Hello

Today is the first day of the rest of the blog, and it is a fine day indeed.
";

    fn fixture<T>(f: impl FnOnce(&Parser<CommonMark>) -> T) -> T {
        let index_url = Url::parse("https://example.org/pages/").unwrap();
        let posts_url = Url::parse("https://example.org/posts/").unwrap();
        let renderer = CommonMark::default();
        let parser = Parser::new(&index_url, &posts_url, Path::new("/out/posts"), &renderer);
        f(&parser)
    }

    #[test]
    fn test_parse_post() -> Result<()> {
        let post = fixture(|parser| parser.parse_post("hello", HELLO))?;
        assert_eq!("Hello, world!", post.title);
        assert_eq!("https://example.org/posts/hello.html", post.url.as_str());
        assert_eq!(PathBuf::from("/out/posts/hello.html"), post.file_path);
        assert_eq!("2021-04-16", post.created.format("%Y-%m-%d").to_string());
        assert_eq!(post.created, post.modified);
        assert_eq!("notes", post.category.slug);
        assert_eq!(2, post.tags.len());
        assert_eq!(
            "Hello Today is the first day of the rest of the blog, ",
            post.excerpt
        );
        assert!(post.truncated);
        assert!(post.body.starts_with(r#"<h3 id="hello">Hello</h3>"#));
        assert!(post.toc.contains(r##"href="#hello""##));
        Ok(())
    }

    #[test]
    fn test_explicit_excerpt_and_modified() -> Result<()> {
        let input = "---
Title: T
Date: 2021-04-16 08:30:00
Modified: 2021-05-01
Category: Notes
Excerpt: Hand written
Author: Jo
---
body";
        let post = fixture(|parser| parser.parse_post("t", input))?;
        assert_eq!("Hand written", post.excerpt);
        assert!(!post.truncated);
        assert_eq!(Some("Jo".to_owned()), post.author);
        assert_eq!("08:30", post.created.format("%H:%M").to_string());
        assert_eq!("2021-05-01", post.modified.format("%Y-%m-%d").to_string());
        Ok(())
    }

    #[test]
    fn test_frontmatter_errors() {
        let missing_start = fixture(|parser| parser.parse_post("x", "Title: x\n---\n"));
        assert!(matches!(missing_start, Err(Error::FrontmatterMissingStartFence)));

        let missing_end = fixture(|parser| parser.parse_post("x", "---\nTitle: x\n"));
        assert!(matches!(missing_end, Err(Error::FrontmatterMissingEndFence)));

        let bad_date = fixture(|parser| {
            parser.parse_post("x", "---\nTitle: x\nDate: soon\nCategory: c\n---\n")
        });
        assert!(matches!(bad_date, Err(Error::Date(ref d, _)) if d == "soon"));

        let no_category =
            fixture(|parser| parser.parse_post("x", "---\nTitle: x\nDate: 2021-01-01\n---\n"));
        assert!(matches!(no_category, Err(Error::DeserializeYaml(_))));
    }

    #[test]
    fn test_parse_posts() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join("hello.md"), HELLO)?;
        std::fs::write(
            dir.path().join("later.md"),
            "---\nTitle: Later\nDate: 2022-01-01\nCategory: Notes\n---\nLater.",
        )?;
        std::fs::write(dir.path().join("notes.txt"), "not a post")?;

        let catalog = fixture(|parser| parser.parse_posts(dir.path()))?;
        let ids: Vec<&str> = catalog.posts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(vec!["later", "hello"], ids);
        Ok(())
    }

    #[test]
    fn test_parse_posts_annotates_errors() -> std::io::Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join("broken.md"), "no frontmatter")?;
        match fixture(|parser| parser.parse_posts(dir.path())) {
            Err(err @ Error::Annotated(..)) => {
                assert!(err.to_string().contains("broken.md"));
                assert!(err.to_string().ends_with("Post must begin with `---`"));
            }
            other => panic!("wanted an annotated error, got {:?}", other.map(|c| c.len())),
        }
        Ok(())
    }
}
