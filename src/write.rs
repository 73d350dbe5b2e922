use crate::pagination::{self, page_count};
use crate::post::Post;
use crate::repository::{Month, PostRepository};
use crate::value;
use gtmpl::{Template, Value};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// Site-wide values made available to every template under `site`.
pub struct Site<'a> {
    pub title: &'a str,
    pub description: &'a str,

    /// The URL for the site's home page, typically the destination for the
    /// site-header link.
    pub home_page: &'a Url,

    /// The URL for the static assets, typically for the theme's stylesheet.
    pub static_url: &'a Url,

    /// The URL of the syndication feed.
    pub feed_url: &'a Url,
}

/// Responsible for indexing, templating, and writing HTML pages to disk from
/// the posts of a [`PostRepository`].
pub struct Writer<'a, R> {
    pub repository: &'a R,

    /// The template for post pages.
    pub posts_template: &'a Template,

    /// The template for index pages.
    pub index_template: &'a Template,

    /// The base URL for index pages. The main index pages will be located at
    /// `{index_url}/index.html`, `{index_url}/2.html`, etc. Category, tag and
    /// archive index pages live under `{index_url}/category/{slug}/`,
    /// `{index_url}/tag/{slug}/` and `{index_url}/archive/{year}/{month}/`.
    pub index_url: &'a Url,

    /// The directory in which the index HTML files will be written, laid out
    /// like [`Writer::index_url`].
    pub index_output_directory: &'a Path,

    /// The number of posts per index page.
    pub index_page_size: usize,

    /// The number of page links on each side of the current index page.
    pub pagination_window: usize,

    /// The number of posts in the sidebar's recent posts list.
    pub recent_posts: usize,

    pub site: Site<'a>,
}

impl<'a, R: PostRepository> Writer<'a, R> {
    /// Takes a single [`Page`], templates it, and writes it to disk.
    fn write_page(&self, page: &Page, shared: &HashMap<String, Value>) -> Result<()> {
        let mut value = page.to_value();
        if let Value::Object(obj) = &mut value {
            obj.extend(shared.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        debug!("Writing `{}`", page.file_path.display());
        page.template.execute(
            &mut std::fs::File::create(&page.file_path)?,
            &gtmpl::Context::from(value)?,
        )?;
        Ok(())
    }

    fn shared_values(&self) -> Result<HashMap<String, Value>> {
        let mut site: HashMap<String, Value> = HashMap::new();
        site.insert("title".to_owned(), Value::String(self.site.title.to_owned()));
        site.insert(
            "description".to_owned(),
            Value::String(self.site.description.to_owned()),
        );
        site.insert(
            "home_page".to_owned(),
            Value::String(self.site.home_page.to_string()),
        );
        site.insert(
            "static_url".to_owned(),
            Value::String(self.site.static_url.to_string()),
        );
        site.insert(
            "feed_url".to_owned(),
            Value::String(self.site.feed_url.to_string()),
        );

        let mut shared: HashMap<String, Value> = HashMap::new();
        shared.insert("site".to_owned(), Value::Object(site));
        shared.insert(
            "sidebar".to_owned(),
            value::sidebar(self.repository, self.recent_posts, |month| {
                archive_url(self.index_url, month)?.join("index.html")
            })?,
        );
        Ok(shared)
    }

    /// Indexes the posts by category, tag and month, and writes post and
    /// index pages to disk.
    pub fn write_posts(&self) -> Result<()> {
        let shared = self.shared_values()?;
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let mut written = 0;
        for page in self.index_pages()?.into_iter().chain(self.post_pages()) {
            if let Some(dir) = page.file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir)?;
                }
            }
            self.write_page(&page, &shared)?;
            written += 1;
        }
        info!("Wrote {} pages", written);
        Ok(())
    }

    /// Creates all of the post [`Page`]s. Each post links to its newer
    /// (`prev`) and older (`next`) neighbours.
    fn post_pages(&self) -> impl Iterator<Item = Page<'a>> + '_ {
        let posts = self.repository.posts();
        posts.iter().enumerate().map(move |(i, post)| Page {
            item: post.to_value(),
            title: post.title.clone(),
            file_path: post.file_path.clone(),
            prev: match i < 1 {
                true => None,
                false => Some(posts[i - 1].url.clone()),
            },
            next: posts.get(i + 1).map(|p| p.url.clone()),
            pagination: Value::Nil,
            template: self.posts_template,
        })
    }

    /// Creates all of the index [`Page`]s.
    fn index_pages(&self) -> Result<Vec<Page<'a>>> {
        let mut pages = Vec::new();
        for index in self.indices()? {
            debug!(
                "Indexing `{}` ({} posts)",
                index.title,
                index.posts.len()
            );
            pages.extend(index.to_pages(
                self.index_page_size,
                self.pagination_window,
                self.index_template,
            )?);
        }
        Ok(pages)
    }

    /// Builds the main index plus one index per category, tag and month.
    fn indices(&self) -> Result<Vec<Index<'_>>> {
        let repository = self.repository;
        let mut indices = vec![Index {
            title: String::from("All posts"),
            url: self.index_url.clone(),
            output_directory: self.index_output_directory.to_owned(),
            posts: repository.posts().iter().collect(),
        }];

        for (category, _) in repository.categories() {
            let dir = format!("category/{}/", category.slug);
            indices.push(Index {
                title: format!("Category: {}", category.name),
                url: self.index_url.join(&dir)?,
                output_directory: self.index_output_directory.join(&dir),
                posts: repository.in_category(category),
            });
        }

        for (tag, _) in repository.tags() {
            let dir = format!("tag/{}/", tag.slug);
            indices.push(Index {
                title: format!("Tag: {}", tag.name),
                url: self.index_url.join(&dir)?,
                output_directory: self.index_output_directory.join(&dir),
                posts: repository.tagged(tag),
            });
        }

        for month in repository.archives() {
            indices.push(Index {
                title: format!("Archive: {:04}-{:02}", month.year, month.month),
                url: archive_url(self.index_url, month)?,
                output_directory: self
                    .index_output_directory
                    .join(archive_path(month)),
                posts: repository.in_month(month),
            });
        }

        Ok(indices)
    }
}

fn archive_path(month: Month) -> String {
    format!("archive/{:04}/{:02}/", month.year, month.month)
}

fn archive_url(index_url: &Url, month: Month) -> std::result::Result<Url, url::ParseError> {
    index_url.join(&archive_path(month))
}

/// An object representing an output HTML file. A [`Page`] can be converted to a
/// [`Value`] and thus rendered in a template via [`Page::to_value`].
struct Page<'a> {
    /// The main item for the page: a post, or the list of post summaries.
    item: Value,

    /// The title of the page.
    title: String,

    /// The target location on disk for the output file.
    file_path: PathBuf,

    /// The URL for the previous page, if any.
    prev: Option<Url>,

    /// The URL for the next page, if any.
    next: Option<Url>,

    /// The page-number navigation for index pages, [`Value::Nil`] otherwise.
    pagination: Value,

    /// The template with which the page will be rendered.
    template: &'a Template,
}

impl Page<'_> {
    /// Converts a [`Page`] into a [`Value`]. The result is a [`Value::Object`]
    /// with fields `item`, `title`, `prev`, `next` and `pagination` (see
    /// [`Page`] for descriptions).
    fn to_value(&self) -> Value {
        let option_to_value = |opt: &Option<Url>| match opt {
            Some(url) => Value::String(url.to_string()),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("item".to_owned(), self.item.clone());
        m.insert("title".to_owned(), Value::String(self.title.clone()));
        m.insert("prev".to_owned(), option_to_value(&self.prev));
        m.insert("next".to_owned(), option_to_value(&self.next));
        m.insert("pagination".to_owned(), self.pagination.clone());
        Value::Object(m)
    }
}

/// `Index` represents a listing of [`Post`]s: all posts, or those of one
/// category, tag or month.
struct Index<'p> {
    /// The title of the listing.
    title: String,

    /// The base URL for the index pages. Ends with a slash.
    url: Url,

    /// The output directory for the index pages.
    output_directory: PathBuf,

    /// The posts in the listing, newest first.
    posts: Vec<&'p Post>,
}

impl Index<'_> {
    /// The URL of the 1-based page `page`.
    fn page_url(&self, page: usize) -> std::result::Result<Url, url::ParseError> {
        self.url.join(&page_file_name(page))
    }

    /// Converts the index to a list of index pages of `page_size` posts,
    /// each carrying the pagination plan for a window of `window` page links.
    fn to_pages<'t>(
        &self,
        page_size: usize,
        window: usize,
        template: &'t Template,
    ) -> Result<Vec<Page<'t>>> {
        let total_pages = page_count(self.posts.len(), page_size)?;

        let mut pages = Vec::with_capacity(total_pages);
        for page in 1..=total_pages {
            let plan = pagination::compute(page, total_pages, window)?;
            let posts = self.posts.iter().skip((page - 1) * page_size).take(page_size);
            pages.push(Page {
                item: Value::Array(posts.map(|p| p.summarize()).collect()),
                title: self.title.clone(),
                file_path: self.output_directory.join(page_file_name(page)),
                prev: match page {
                    1 => None,
                    _ => Some(self.page_url(page - 1)?),
                },
                next: match page < total_pages {
                    false => None,
                    true => Some(self.page_url(page + 1)?),
                },
                pagination: value::pagination(&plan, page, total_pages, |n| self.page_url(n))?,
                template,
            });
        }
        Ok(pages)
    }
}

fn page_file_name(page: usize) -> String {
    match page {
        1 => String::from("index.html"),
        _ => format!("{}.html", page),
    }
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error computing an index page's pagination.
    Pagination(pagination::Error),

    /// An error building a page URL.
    UrlParse(url::ParseError),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl From<pagination::Error> for Error {
    fn from(err: pagination::Error) -> Error {
        Error::Pagination(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Pagination(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Pagination(err) => Some(err),
            Error::UrlParse(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}
