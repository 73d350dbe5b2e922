//! Defines the [`Post`] type and its conversions into template values. See
//! [`crate::parser`] for how posts are read from disk.

use crate::tag::{Category, Tag};
use chrono::NaiveDateTime;
use gtmpl::Value;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use url::Url;

/// The number of characters taken from a post's plain text when the
/// frontmatter doesn't provide an excerpt.
pub const EXCERPT_LENGTH: usize = 54;

/// The format for post dates in templates and in the frontmatter.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Represents a blog post.
#[derive(Clone, Debug)]
pub struct Post {
    /// The file stem of the post's source file, e.g., `hello` for
    /// `posts/hello.md`.
    pub id: String,

    /// The output location for the rendered post file.
    pub file_path: PathBuf,

    /// The URL for the rendered output file.
    pub url: Url,

    /// The title of the post.
    pub title: String,

    /// When the post was created.
    pub created: NaiveDateTime,

    /// When the post was last modified.
    pub modified: NaiveDateTime,

    /// A short plain-text summary shown on index pages.
    pub excerpt: String,

    /// Whether [`Post::excerpt`] was cut from a longer body, so templates
    /// know to mark it as continued.
    pub truncated: bool,

    /// The post's category.
    pub category: Category,

    /// The tags associated with the post.
    pub tags: HashSet<Tag>,

    /// The post's author, if any.
    pub author: Option<String>,

    /// The rendered HTML of the post body.
    pub body: String,

    /// The post body as plain text, without markup. Search matches against
    /// this rather than [`Post::body`].
    pub text: String,

    /// The rendered table of contents of the post body.
    pub toc: String,
}

impl Post {
    /// Derives an excerpt from a post's plain text: the first
    /// [`EXCERPT_LENGTH`] characters.
    pub fn excerpt_from(text: &str) -> String {
        text.chars().take(EXCERPT_LENGTH).collect()
    }

    /// Returns the tags sorted by slug so templates render them in a stable
    /// order.
    pub fn sorted_tags(&self) -> Vec<&Tag> {
        let mut tags: Vec<&Tag> = self.tags.iter().collect();
        tags.sort();
        tags
    }

    /// Whether the post was created in the given month.
    pub fn in_month(&self, year: i32, month: u32) -> bool {
        use chrono::Datelike;
        self.created.year() == year && self.created.month() == month
    }

    /// Converts the post into a [`Value`] for the post template. The result
    /// has the fields of [`Post::summarize`] plus `body`, `toc`, `modified`
    /// and `author`.
    pub fn to_value(&self) -> Value {
        let mut m = self.fields();
        m.insert("body".to_owned(), Value::String(self.body.clone()));
        m.insert("toc".to_owned(), Value::String(self.toc.clone()));
        m.insert(
            "modified".to_owned(),
            Value::String(self.modified.format(DATE_FORMAT).to_string()),
        );
        m.insert(
            "author".to_owned(),
            match &self.author {
                Some(author) => Value::String(author.clone()),
                None => Value::Nil,
            },
        );
        Value::Object(m)
    }

    /// Converts the post into a summary [`Value`] for index pages. The result
    /// is an object with `id`, `url`, `title`, `date`, `excerpt`,
    /// `truncated`, `category` and `tags` fields.
    pub fn summarize(&self) -> Value {
        Value::Object(self.fields())
    }

    fn fields(&self) -> HashMap<String, Value> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("id".to_owned(), Value::String(self.id.clone()));
        m.insert("url".to_owned(), Value::String(self.url.to_string()));
        m.insert("title".to_owned(), Value::String(self.title.clone()));
        m.insert(
            "date".to_owned(),
            Value::String(self.created.format(DATE_FORMAT).to_string()),
        );
        m.insert("excerpt".to_owned(), Value::String(self.excerpt.clone()));
        m.insert("truncated".to_owned(), Value::Bool(self.truncated));
        m.insert("category".to_owned(), Value::from(&self.category));
        m.insert(
            "tags".to_owned(),
            Value::Array(self.sorted_tags().into_iter().map(Value::from).collect()),
        );
        m
    }
}

/// Orders posts newest first, breaking ties by title.
pub fn newest_first(a: &Post, b: &Post) -> std::cmp::Ordering {
    b.created.cmp(&a.created).then_with(|| a.title.cmp(&b.title))
}
