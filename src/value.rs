//! Conversions from the crate's types into template [`Value`]s that don't
//! belong to any one type: the pagination links and the sidebar.

use crate::pagination::DisplayPlan;
use crate::post::Post;
use crate::repository::{Month, PostRepository};
use gtmpl::Value;
use std::collections::HashMap;
use url::{ParseError, Url};

/// Builds the `pagination` value of an index page from its [`DisplayPlan`].
/// `url` maps a page number to its URL. The result has the plan's flags,
/// `left` and `right` as lists of `{number, url}` objects, `page`,
/// `total_pages`, `first_url` and `last_url`. A single-page listing yields
/// [`Value::Nil`] so templates can skip the navigation entirely.
pub fn pagination(
    plan: &DisplayPlan,
    page: usize,
    total_pages: usize,
    url: impl Fn(usize) -> Result<Url, ParseError>,
) -> Result<Value, ParseError> {
    if total_pages <= 1 {
        return Ok(Value::Nil);
    }

    let links = |numbers: &[usize]| -> Result<Value, ParseError> {
        let mut links = Vec::with_capacity(numbers.len());
        for &n in numbers {
            let mut m: HashMap<String, Value> = HashMap::new();
            m.insert("number".to_owned(), Value::from(n as u64));
            m.insert("url".to_owned(), Value::String(url(n)?.to_string()));
            links.push(Value::Object(m));
        }
        Ok(Value::Array(links))
    };

    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("left".to_owned(), links(&plan.left)?);
    m.insert("right".to_owned(), links(&plan.right)?);
    m.insert("left_has_more".to_owned(), Value::Bool(plan.left_has_more));
    m.insert("right_has_more".to_owned(), Value::Bool(plan.right_has_more));
    m.insert("show_first".to_owned(), Value::Bool(plan.show_first));
    m.insert("show_last".to_owned(), Value::Bool(plan.show_last));
    m.insert("page".to_owned(), Value::from(page as u64));
    m.insert("total_pages".to_owned(), Value::from(total_pages as u64));
    m.insert("first_url".to_owned(), Value::String(url(1)?.to_string()));
    m.insert(
        "last_url".to_owned(),
        Value::String(url(total_pages)?.to_string()),
    );
    Ok(Value::Object(m))
}

impl From<&Month> for Value {
    fn from(month: &Month) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("year".to_owned(), Value::from(month.year as i64));
        m.insert("month".to_owned(), Value::from(month.month as u64));
        m.insert(
            "label".to_owned(),
            Value::String(format!("{:04}-{:02}", month.year, month.month)),
        );
        Value::Object(m)
    }
}

/// Builds the sidebar shared by every page: the `recent` most recent posts,
/// the archive months, and the categories and tags with their post counts.
/// `archive_url` maps a month to its first index page.
pub fn sidebar<R: PostRepository>(
    repository: &R,
    recent: usize,
    archive_url: impl Fn(Month) -> Result<Url, ParseError>,
) -> Result<Value, ParseError> {
    let counted = |value: Value, count: usize| -> Value {
        let mut value = value;
        if let Value::Object(m) = &mut value {
            m.insert("count".to_owned(), Value::from(count as u64));
        }
        value
    };

    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert(
        "recent".to_owned(),
        Value::Array(repository.recent(recent).iter().map(Post::summarize).collect()),
    );
    let mut archives = Vec::new();
    for month in repository.archives() {
        let mut value = Value::from(&month);
        if let Value::Object(m) = &mut value {
            m.insert(
                "url".to_owned(),
                Value::String(archive_url(month)?.to_string()),
            );
        }
        archives.push(value);
    }
    m.insert("archives".to_owned(), Value::Array(archives));
    m.insert(
        "categories".to_owned(),
        Value::Array(
            repository
                .categories()
                .into_iter()
                .map(|(c, n)| counted(Value::from(c), n))
                .collect(),
        ),
    );
    m.insert(
        "tags".to_owned(),
        Value::Array(
            repository
                .tags()
                .into_iter()
                .map(|(t, n)| counted(Value::from(t), n))
                .collect(),
        ),
    );
    Ok(Value::Object(m))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pagination::compute;
    use crate::post::testing::post;
    use crate::repository::Catalog;

    fn page_url(n: usize) -> Result<Url, ParseError> {
        Url::parse(&format!("https://example.org/pages/{}.html", n))
    }

    fn urls(value: Option<&Value>) -> Vec<String> {
        match value {
            Some(Value::Array(links)) => links
                .iter()
                .filter_map(|link| match link {
                    Value::Object(m) => match m.get("url") {
                        Some(Value::String(url)) => Some(url.clone()),
                        _ => None,
                    },
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_pagination_links() -> Result<(), ParseError> {
        let plan = compute(5, 10, 2).unwrap();
        match pagination(&plan, 5, 10, page_url)? {
            Value::Object(m) => {
                assert_eq!(
                    vec![
                        "https://example.org/pages/3.html",
                        "https://example.org/pages/4.html"
                    ],
                    urls(m.get("left"))
                );
                assert_eq!(
                    vec![
                        "https://example.org/pages/6.html",
                        "https://example.org/pages/7.html"
                    ],
                    urls(m.get("right"))
                );
                assert!(matches!(m.get("show_last"), Some(Value::Bool(true))));
                assert!(matches!(
                    m.get("last_url"),
                    Some(Value::String(url)) if url == "https://example.org/pages/10.html"
                ));
            }
            _ => panic!("wanted an object"),
        }
        Ok(())
    }

    #[test]
    fn test_single_page_pagination_is_nil() -> Result<(), ParseError> {
        let plan = compute(1, 1, 2).unwrap();
        assert!(matches!(pagination(&plan, 1, 1, page_url)?, Value::Nil));
        Ok(())
    }

    #[test]
    fn test_sidebar_counts() -> Result<(), ParseError> {
        let catalog = Catalog::new(vec![
            post("a", (2021, 1, 1), "Rust", &["cli"]),
            post("b", (2021, 2, 1), "Rust", &[]),
        ]);
        let archive_url = |m: Month| {
            Url::parse(&format!(
                "https://example.org/pages/archive/{}/{:02}/index.html",
                m.year, m.month
            ))
        };
        match sidebar(&catalog, 1, archive_url)? {
            Value::Object(m) => {
                assert!(matches!(m.get("recent"), Some(Value::Array(r)) if r.len() == 1));
                assert_eq!(
                    vec![
                        "https://example.org/pages/archive/2021/02/index.html",
                        "https://example.org/pages/archive/2021/01/index.html"
                    ],
                    urls(m.get("archives"))
                );
                match m.get("categories") {
                    Some(Value::Array(categories)) => match &categories[..] {
                        [Value::Object(rust)] => {
                            assert!(matches!(rust.get("name"), Some(Value::String(n)) if n == "Rust"));
                            assert!(rust.contains_key("count"));
                        }
                        _ => panic!("wanted one category"),
                    },
                    _ => panic!("wanted categories"),
                }
            }
            _ => panic!("wanted an object"),
        }
        Ok(())
    }
}
