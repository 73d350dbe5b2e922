//! Converts post bodies from Markdown into HTML. The [`MarkupRenderer`] trait
//! is the seam the rest of the crate renders through; [`CommonMark`] is the
//! `pulldown_cmark`-backed implementation.

use crate::htmlrenderer::{push_html, EscapeHtml};
use pulldown_cmark::{Event, Options, Parser, Tag};
use std::collections::HashMap;
use std::fmt;
use std::io;

/// The output of rendering a post body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    /// The body as HTML.
    pub html: String,

    /// A nested list of links to the body's headings, or the empty string if
    /// the body has none.
    pub toc: String,

    /// The body with all markup stripped. Used to derive excerpts.
    pub text: String,
}

/// Renders markup into [`Rendered`] HTML.
pub trait MarkupRenderer {
    /// Renders `source`. `footnote_prefix` is prepended onto footnote links
    /// so they resolve from pages other than the post page (typically the
    /// post's URL).
    fn render(&self, source: &str, footnote_prefix: &str) -> Result<Rendered>;
}

/// Renders CommonMark with tables, footnotes, strikethrough, task lists and
/// smart punctuation.
#[derive(Clone, Copy, Debug)]
pub struct CommonMark {
    /// Added to every heading level. Post bodies are nested under the site
    /// title (h1) and the post title (h2), so `#` becomes h3 by default.
    pub heading_offset: u32,
}

impl Default for CommonMark {
    fn default() -> Self {
        CommonMark { heading_offset: 2 }
    }
}

impl CommonMark {
    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        options
    }

    fn demote<'a>(&self, ev: Event<'a>) -> Event<'a> {
        match ev {
            Event::Start(Tag::Heading(level)) => {
                Event::Start(Tag::Heading((level + self.heading_offset).min(6)))
            }
            Event::End(Tag::Heading(level)) => {
                Event::End(Tag::Heading((level + self.heading_offset).min(6)))
            }
            _ => ev,
        }
    }
}

impl MarkupRenderer for CommonMark {
    fn render(&self, source: &str, footnote_prefix: &str) -> Result<Rendered> {
        let events: Vec<Event> = Parser::new_ext(source, Self::options())
            .map(|ev| self.demote(ev))
            .collect();

        let headings = headings(&events);
        let ids = heading_ids(&headings);

        let mut html = String::new();
        push_html(&mut html, events.iter().cloned(), footnote_prefix, &ids)?;

        Ok(Rendered {
            html,
            toc: toc(&headings, &ids),
            text: plain_text(&events),
        })
    }
}

struct Heading {
    level: u32,
    text: String,
}

fn headings(events: &[Event]) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut current: Option<Heading> = None;
    for ev in events {
        match ev {
            Event::Start(Tag::Heading(level)) => {
                current = Some(Heading {
                    level: *level,
                    text: String::new(),
                })
            }
            Event::End(Tag::Heading(_)) => headings.extend(current.take()),
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = current.as_mut() {
                    heading.text.push_str(text);
                }
            }
            _ => {}
        }
    }
    headings
}

// Slugifies heading texts, suffixing repeats with `-1`, `-2`, ...
fn heading_ids(headings: &[Heading]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headings
        .iter()
        .map(|h| {
            let mut slug = slug::slugify(&h.text);
            if slug.is_empty() {
                slug = String::from("section");
            }
            let count = seen.entry(slug.clone()).or_insert(0);
            let id = match *count {
                0 => slug,
                n => format!("{}-{}", slug, n),
            };
            *count += 1;
            id
        })
        .collect()
}

fn toc(headings: &[Heading], ids: &[String]) -> String {
    if headings.is_empty() {
        return String::new();
    }

    use std::fmt::Write;
    let mut out = String::from(r#"<div class="toc">"#);
    let mut levels: Vec<u32> = Vec::new();
    for (heading, id) in headings.iter().zip(ids) {
        match levels.last() {
            Some(&last) if heading.level > last => {
                out.push_str("<ul>");
                levels.push(heading.level);
            }
            Some(_) => {
                while levels.len() > 1 && levels[levels.len() - 1] > heading.level {
                    out.push_str("</li></ul>");
                    levels.pop();
                }
                out.push_str("</li>");
            }
            None => {
                out.push_str("<ul>");
                levels.push(heading.level);
            }
        }
        // Writing into a `String` can't fail.
        let _ = write!(
            out,
            r##"<li><a href="#{}">{}</a>"##,
            EscapeHtml(id),
            EscapeHtml(&heading.text)
        );
    }
    for _ in levels {
        out.push_str("</li></ul>");
    }
    out.push_str("</div>");
    out
}

fn plain_text(events: &[Event]) -> String {
    let mut text = String::new();
    for ev in events {
        match ev {
            Event::Text(s) | Event::Code(s) => text.push_str(s),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(Tag::Paragraph) | Event::End(Tag::Heading(_)) | Event::End(Tag::Item) => {
                text.push(' ')
            }
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error converting markdown to HTML.
#[derive(Debug)]
pub enum Error {
    /// Returned when writing the output fails.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "rendering markdown: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    /// Converts a [`io::Error`] into an [`Error`]. It allows us to use the `?`
    /// operator for IO operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
