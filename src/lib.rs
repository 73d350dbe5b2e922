//! The library code for the `folio` blog generator. The architecture can be
//! generally broken down into two distinct steps:
//!
//! 1. Parsing posts from source files on disk ([`crate::parser`]) into a
//!    [`crate::repository::Catalog`]
//! 2. Converting the posts into output files on disk ([`crate::write`])
//!
//! Of the two, the second step is the more involved. Besides one page per
//! post, every listing of posts gets a group of index pages: all posts, each
//! category, each tag and each month with posts. A group of index pages is
//! referred to as an "index", and each index is paginated: split into pages
//! of a configurable number of posts. Every index page carries the page
//! number navigation computed by [`crate::pagination::compute`], which
//! decides which neighbouring page links to show, whether the first and last
//! pages are pinned, and where ellipses go.
//!
//! Finally the Atom feed is written ([`crate::feed`]), and the posts can be
//! searched from the command line ([`crate::search`]).

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod feed;
mod htmlrenderer;
pub mod markdown;
pub mod pagination;
pub mod parser;
pub mod post;
pub mod repository;
pub mod search;
pub mod tag;
pub mod value;
pub mod write;
