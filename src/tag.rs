//! Defines the [`Tag`] and [`Category`] types, the two ways a
//! [`crate::post::Post`] is classified. A post belongs to exactly one
//! category and any number of tags; both get their own paginated index.

use gtmpl::Value;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use url::Url;

/// Represents a [`crate::post::Post`] tag.
#[derive(Clone, Debug)]
pub struct Tag {
    /// The slugified name, so e.g., `macOS` and `MacOS` resolve to the same
    /// tag and the field can be dropped into a [`Url`].
    pub slug: String,

    /// The name as first written in a post's frontmatter.
    pub name: String,

    /// The URL for the tag's first index page, i.e.
    /// `{index_url}/tag/{slug}/index.html`.
    pub url: Url,
}

/// Represents a [`crate::post::Post`] category.
#[derive(Clone, Debug)]
pub struct Category {
    /// The slugified name. See [`Tag::slug`].
    pub slug: String,

    /// The display name.
    pub name: String,

    /// The URL for the category's first index page, i.e.
    /// `{index_url}/category/{slug}/index.html`.
    pub url: Url,
}

// Names with no sluggable characters (e.g., `!!!`) fall back to the hex of
// their bytes so distinct names still get distinct, non-empty slugs.
fn slug_for(name: &str, fallback: &str) -> String {
    let slug = slug::slugify(name);
    if !slug.is_empty() {
        return slug;
    }
    let hex: String = name.trim().bytes().map(|b| format!("{:02x}", b)).collect();
    if hex.is_empty() {
        fallback.to_owned()
    } else {
        format!("{}-{}", fallback, hex)
    }
}

macro_rules! taxonomy {
    ($type:ident, $segment:literal) => {
        impl $type {
            /// The URL path segment under which this kind of index lives.
            pub const SEGMENT: &'static str = $segment;

            /// Creates a new value from its display `name`, deriving the slug
            /// and the index URL from `index_url`.
            pub fn new(name: &str, index_url: &Url) -> Result<$type, url::ParseError> {
                let slug = slug_for(name, $segment);
                // `index_url` ends with a slash; joining "{segment}/{slug}"
                // without the trailing "index.html" would drop the slug.
                let url = index_url.join(&format!("{}/{}/index.html", $segment, slug))?;
                Ok($type {
                    slug,
                    name: name.to_owned(),
                    url,
                })
            }
        }

        impl Hash for $type {
            /// Hashes by slug only.
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.slug.hash(state)
            }
        }

        impl PartialEq for $type {
            /// Compares by slug only.
            fn eq(&self, other: &Self) -> bool {
                self.slug == other.slug
            }
        }
        impl Eq for $type {}

        impl PartialOrd for $type {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $type {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.slug.cmp(&other.slug)
            }
        }

        impl From<&$type> for Value {
            /// Converts into a [`Value`] for templating.
            fn from(t: &$type) -> Value {
                let mut m: HashMap<String, Value> = HashMap::new();
                m.insert("name".to_owned(), Value::String(t.name.clone()));
                m.insert("slug".to_owned(), Value::String(t.slug.clone()));
                m.insert("url".to_owned(), Value::String(t.url.to_string()));
                Value::Object(m)
            }
        }
    };
}

taxonomy!(Tag, "tag");
taxonomy!(Category, "category");

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slug_identity() -> Result<(), url::ParseError> {
        let index_url = Url::parse("https://example.org/pages/")?;
        let mut tags = HashSet::new();
        tags.insert(Tag::new("macOS", &index_url)?);
        tags.insert(Tag::new("MacOS", &index_url)?);
        assert_eq!(1, tags.len());
        Ok(())
    }

    #[test]
    fn test_index_url() -> Result<(), url::ParseError> {
        let index_url = Url::parse("https://example.org/pages/")?;
        let category = Category::new("Rust Notes", &index_url)?;
        assert_eq!("rust-notes", category.slug);
        assert_eq!("Rust Notes", category.name);
        assert_eq!(
            "https://example.org/pages/category/rust-notes/index.html",
            category.url.as_str()
        );
        Ok(())
    }

    #[test]
    fn test_unsluggable_names() -> Result<(), url::ParseError> {
        let index_url = Url::parse("https://example.org/pages/")?;
        let bangs = Category::new("!!!", &index_url)?;
        let marks = Category::new("???", &index_url)?;
        assert_eq!("category-212121", bangs.slug);
        assert_ne!(bangs, marks);
        assert_eq!(
            "https://example.org/pages/category/category-212121/index.html",
            bangs.url.as_str()
        );
        assert_eq!("tag", Tag::new("  ", &index_url)?.slug);
        Ok(())
    }
}
