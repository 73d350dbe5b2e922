//! Support for creating Atom feeds from a list of posts.

use crate::config::Author;
use crate::post::Post;
use crate::repository::PostRepository;
use atom_syndication::{
    Category as AtomCategory, Content, Entry, Error as AtomError, Feed, Link, Person, Text,
};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::io::Write;
use url::Url;

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    pub title: String,
    pub subtitle: String,
    pub id: String,
    pub author: Option<Author>,
    pub home_page: Url,
    pub feed_url: Url,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and the posts of
/// a [`PostRepository`] and writes the result to a [`std::io::Write`].
pub fn write_feed<R: PostRepository, W: Write>(
    config: &FeedConfig,
    repository: &R,
    w: W,
) -> Result<()> {
    feed(config, repository.posts()).write_to(w)?;
    Ok(())
}

fn feed(config: &FeedConfig, posts: &[Post]) -> Feed {
    let mut feed = Feed::default();
    feed.set_title(config.title.as_str());
    if !config.subtitle.is_empty() {
        feed.set_subtitle(Some(Text::plain(config.subtitle.as_str())));
    }
    feed.set_id(config.id.as_str());
    // The newest modification keeps the feed stable between builds.
    feed.set_updated(match posts.iter().map(|p| p.modified).max() {
        Some(modified) => utc(&modified),
        None => Utc::now(),
    });
    feed.set_authors(author_to_people(config.author.as_ref()));
    feed.set_links(vec![
        link(config.home_page.as_str(), "alternate"),
        link(config.feed_url.as_str(), "self"),
    ]);
    feed.set_entries(
        posts
            .iter()
            .map(|post| feed_entry(config, post))
            .collect::<Vec<Entry>>(),
    );
    feed
}

fn feed_entry(config: &FeedConfig, post: &Post) -> Entry {
    let mut content = Content::default();
    content.set_value(Some(post.body.clone()));
    content.set_content_type(Some(String::from("html")));

    let mut entry = Entry::default();
    entry.set_id(post.url.as_str());
    entry.set_title(format!("[{}] {}", post.category.name, post.title));
    entry.set_updated(utc(&post.modified));
    entry.set_published(Some(DateTime::<FixedOffset>::from(utc(&post.created))));
    entry.set_authors(match &post.author {
        Some(name) => vec![person(name, None)],
        None => author_to_people(config.author.as_ref()),
    });
    entry.set_links(vec![link(post.url.as_str(), "alternate")]);
    entry.set_summary(Some(Text::plain(post.excerpt.as_str())));
    entry.set_content(Some(content));
    entry.set_categories(
        post.sorted_tags()
            .into_iter()
            .map(|tag| {
                let mut category = AtomCategory::default();
                category.set_term(tag.slug.as_str());
                category.set_label(Some(tag.name.clone()));
                category
            })
            .collect::<Vec<AtomCategory>>(),
    );
    entry
}

// Post dates carry no timezone; they're published as UTC.
fn utc(date: &NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(date)
}

fn link(href: &str, rel: &str) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel(rel);
    link
}

fn person(name: &str, email: Option<&str>) -> Person {
    let mut person = Person::default();
    person.set_name(name);
    person.set_email(email.map(str::to_owned));
    person
}

fn author_to_people(author: Option<&Author>) -> Vec<Person> {
    match author {
        Some(author) => vec![person(&author.name, author.email.as_deref())],
        None => Vec::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem writing a feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}
