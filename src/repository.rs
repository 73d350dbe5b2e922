//! Read access to the parsed posts. [`PostRepository`] is what the writer
//! and the feed depend on; [`Catalog`] is the in-memory implementation
//! filled by [`crate::parser::Parser`].

use crate::post::{newest_first, Post};
use crate::tag::{Category, Tag};
use chrono::Datelike;
use std::collections::HashMap;

/// A year and month in which at least one post was created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

/// Provides posts newest first, plus the listings derived from them.
pub trait PostRepository {
    /// All posts, newest first.
    fn posts(&self) -> &[Post];

    /// The `n` most recent posts.
    fn recent(&self, n: usize) -> &[Post] {
        let posts = self.posts();
        &posts[..n.min(posts.len())]
    }

    /// The distinct months with posts, newest first.
    fn archives(&self) -> Vec<Month> {
        let mut months: Vec<Month> = self
            .posts()
            .iter()
            .map(|p| Month {
                year: p.created.year(),
                month: p.created.month(),
            })
            .collect();
        months.sort_by(|a, b| b.cmp(a));
        months.dedup();
        months
    }

    /// Every category in use with its number of posts, sorted by slug.
    fn categories(&self) -> Vec<(&Category, usize)> {
        count(self.posts().iter().map(|p| &p.category))
    }

    /// Every tag in use with its number of posts, sorted by slug.
    fn tags(&self) -> Vec<(&Tag, usize)> {
        count(self.posts().iter().flat_map(|p| p.tags.iter()))
    }

    /// Posts in `category`, newest first.
    fn in_category(&self, category: &Category) -> Vec<&Post> {
        self.posts()
            .iter()
            .filter(|p| &p.category == category)
            .collect()
    }

    /// Posts tagged with `tag`, newest first.
    fn tagged(&self, tag: &Tag) -> Vec<&Post> {
        self.posts().iter().filter(|p| p.tags.contains(tag)).collect()
    }

    /// Posts created in `month`, newest first.
    fn in_month(&self, month: Month) -> Vec<&Post> {
        self.posts()
            .iter()
            .filter(|p| p.in_month(month.year, month.month))
            .collect()
    }
}

fn count<'a, T, I>(items: I) -> Vec<(&'a T, usize)>
where
    T: std::hash::Hash + Eq + Ord + 'a,
    I: Iterator<Item = &'a T>,
{
    let mut counts: HashMap<&T, usize> = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    let mut counts: Vec<(&T, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| a.0.cmp(b.0));
    counts
}

/// Posts held in memory.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    posts: Vec<Post>,
}

impl Catalog {
    /// Creates a catalog, sorting `posts` newest first.
    pub fn new(mut posts: Vec<Post>) -> Catalog {
        posts.sort_by(newest_first);
        Catalog { posts }
    }

    /// The number of posts in the catalog.
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Whether the catalog holds no posts.
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl PostRepository for Catalog {
    fn posts(&self) -> &[Post] {
        &self.posts
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::testing::post;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            post("one", (2021, 1, 5), "Rust", &["cli", "yaml"]),
            post("two", (2021, 3, 1), "Rust", &["cli"]),
            post("three", (2021, 3, 20), "Life", &[]),
            post("four", (2020, 12, 31), "Life", &["yaml"]),
        ])
    }

    fn ids(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_sorted_newest_first() {
        let catalog = catalog();
        let posts: Vec<&Post> = catalog.posts().iter().collect();
        assert_eq!(vec!["three", "two", "one", "four"], ids(&posts));
    }

    #[test]
    fn test_recent() {
        let catalog = catalog();
        assert_eq!(2, catalog.recent(2).len());
        assert_eq!(4, catalog.recent(10).len());
    }

    #[test]
    fn test_archives() {
        let months: Vec<(i32, u32)> = catalog()
            .archives()
            .into_iter()
            .map(|m| (m.year, m.month))
            .collect();
        assert_eq!(vec![(2021, 3), (2021, 1), (2020, 12)], months);
    }

    #[test]
    fn test_counts() {
        let catalog = catalog();
        let categories: Vec<(String, usize)> = catalog
            .categories()
            .into_iter()
            .map(|(c, n)| (c.slug.clone(), n))
            .collect();
        assert_eq!(
            vec![("life".to_owned(), 2), ("rust".to_owned(), 2)],
            categories
        );

        let tags: Vec<(String, usize)> = catalog
            .tags()
            .into_iter()
            .map(|(t, n)| (t.slug.clone(), n))
            .collect();
        assert_eq!(vec![("cli".to_owned(), 2), ("yaml".to_owned(), 2)], tags);
    }

    #[test]
    fn test_filters() {
        let catalog = catalog();
        let rust = catalog.posts()[1].category.clone();
        assert_eq!(vec!["two", "one"], ids(&catalog.in_category(&rust)));

        let yaml = catalog.posts()[2]
            .tags
            .iter()
            .find(|t| t.slug == "yaml")
            .cloned()
            .unwrap();
        assert_eq!(vec!["one", "four"], ids(&catalog.tagged(&yaml)));

        let march = Month {
            year: 2021,
            month: 3,
        };
        assert_eq!(vec!["three", "two"], ids(&catalog.in_month(march)));
    }
}
