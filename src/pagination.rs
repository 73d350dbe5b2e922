//! Computes the page-number navigation for paginated listings. Given the
//! current page and the total number of pages, [`compute`] decides which
//! page numbers sit either side of the current page, whether the first and
//! last pages need to be pinned, and whether an ellipsis separates a pinned
//! page from the window.

use std::fmt;

/// The number of page links rendered on each side of the current page when
/// the project doesn't configure one.
pub const DEFAULT_WINDOW: usize = 2;

/// Describes which page links a paginated listing should render. The
/// default value is the empty plan, used when there is only one page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayPlan {
    /// Page numbers immediately before the current page, ascending.
    pub left: Vec<usize>,

    /// Page numbers immediately after the current page, ascending.
    pub right: Vec<usize>,

    /// An ellipsis goes between the pinned first page and `left`.
    pub left_has_more: bool,

    /// An ellipsis goes between `right` and the pinned last page.
    pub right_has_more: bool,

    /// Page 1 isn't in `left` and must be rendered explicitly.
    pub show_first: bool,

    /// The last page isn't in `right` and must be rendered explicitly.
    pub show_last: bool,
}

impl DisplayPlan {
    /// Returns `true` for the plan of a listing with a single page.
    pub fn is_empty(&self) -> bool {
        self == &DisplayPlan::default()
    }
}

/// Computes the [`DisplayPlan`] for `current_page` (1-based) out of
/// `total_pages`, showing up to `window` page numbers on each side.
///
/// Windows are clipped to `[1, total_pages]` rather than shifted, so a page
/// near either end gets a shorter window. The ellipsis flags compare against
/// the page adjacent to the boundary (`2` and `total_pages - 1`) while the
/// pinned-page flags compare against the boundary itself, so a window ending
/// one page short of the boundary pins the boundary page without an
/// ellipsis.
pub fn compute(
    current_page: usize,
    total_pages: usize,
    window: usize,
) -> Result<DisplayPlan> {
    if total_pages < 1 {
        return Err(Error::NoPages);
    }
    if current_page < 1 || current_page > total_pages {
        return Err(Error::PageOutOfRange {
            page: current_page,
            total_pages,
        });
    }
    if total_pages == 1 {
        return Ok(DisplayPlan::default());
    }

    let mut plan = DisplayPlan::default();

    if current_page > 1 {
        plan.left = (current_page.saturating_sub(window).max(1)..current_page)
            .collect();
        let leftmost = plan.left.first().copied().unwrap_or(current_page);
        plan.left_has_more = leftmost > 2;
        plan.show_first = leftmost > 1;
    }

    if current_page < total_pages {
        plan.right = (current_page + 1
            ..=current_page.saturating_add(window).min(total_pages))
            .collect();
        let rightmost = plan.right.last().copied().unwrap_or(current_page);
        plan.right_has_more = rightmost < total_pages - 1;
        plan.show_last = rightmost < total_pages;
    }

    Ok(plan)
}

/// Returns the number of pages needed to list `items` entries at
/// `page_size` entries per page. An empty listing still gets one page.
pub fn page_count(items: usize, page_size: usize) -> Result<usize> {
    if page_size == 0 {
        return Err(Error::ZeroPageSize);
    }
    Ok(match items % page_size {
        0 => items / page_size,
        _ => items / page_size + 1,
    }
    .max(1))
}

/// The result of a pagination computation.
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when pagination is requested with arguments that can't describe
/// a listing. These are caller bugs; the caller should clamp the requested
/// page before asking for a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The listing was said to have zero pages.
    NoPages,

    /// The current page isn't within `[1, total_pages]`.
    PageOutOfRange { page: usize, total_pages: usize },

    /// A page can't hold zero items.
    ZeroPageSize,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NoPages => write!(f, "invalid argument: total pages must be at least 1"),
            Error::PageOutOfRange { page, total_pages } => write!(
                f,
                "invalid argument: page {} is outside of [1, {}]",
                page, total_pages
            ),
            Error::ZeroPageSize => write!(f, "invalid argument: page size must be at least 1"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;

    fn plan(
        left: &[usize],
        right: &[usize],
        flags: (bool, bool, bool, bool),
    ) -> DisplayPlan {
        let (left_has_more, show_first, right_has_more, show_last) = flags;
        DisplayPlan {
            left: left.to_vec(),
            right: right.to_vec(),
            left_has_more,
            right_has_more,
            show_first,
            show_last,
        }
    }

    #[test]
    fn test_single_page_is_empty() -> Result<()> {
        let plan = compute(1, 1, DEFAULT_WINDOW)?;
        assert!(plan.is_empty());
        assert_eq!(DisplayPlan::default(), plan);
        Ok(())
    }

    #[test]
    fn test_first_page() -> Result<()> {
        assert_eq!(
            plan(&[], &[2, 3], (false, false, false, true)),
            compute(1, 4, DEFAULT_WINDOW)?
        );
        Ok(())
    }

    #[test]
    fn test_last_page() -> Result<()> {
        assert_eq!(
            plan(&[2, 3], &[], (false, true, false, false)),
            compute(4, 4, DEFAULT_WINDOW)?
        );
        Ok(())
    }

    #[test]
    fn test_interior_page_with_ellipses() -> Result<()> {
        assert_eq!(
            plan(&[3, 4], &[6, 7], (true, true, true, true)),
            compute(5, 10, DEFAULT_WINDOW)?
        );
        Ok(())
    }

    #[test]
    fn test_interior_page_touching_both_ends() -> Result<()> {
        assert_eq!(
            plan(&[1], &[3], (false, false, false, false)),
            compute(2, 3, DEFAULT_WINDOW)?
        );
        Ok(())
    }

    #[test]
    fn test_pinned_without_ellipsis() -> Result<()> {
        // right ends at 8 of 9: pin 9, nothing skipped
        let plan = compute(6, 9, DEFAULT_WINDOW)?;
        assert_eq!(vec![7, 8], plan.right);
        assert!(plan.show_last);
        assert!(!plan.right_has_more);
        Ok(())
    }

    #[test]
    fn test_zero_window() -> Result<()> {
        assert_eq!(
            plan(&[], &[], (true, true, true, true)),
            compute(5, 10, 0)?
        );
        assert_eq!(plan(&[], &[], (false, false, false, true)), compute(1, 2, 0)?);
        Ok(())
    }

    #[test]
    fn test_invalid_arguments() {
        assert_eq!(Err(Error::NoPages), compute(1, 0, DEFAULT_WINDOW));
        assert_eq!(
            Err(Error::PageOutOfRange {
                page: 0,
                total_pages: 3
            }),
            compute(0, 3, DEFAULT_WINDOW)
        );
        assert_eq!(
            Err(Error::PageOutOfRange {
                page: 4,
                total_pages: 3
            }),
            compute(4, 3, DEFAULT_WINDOW)
        );
    }

    #[test]
    fn test_invariants_and_symmetry() -> Result<()> {
        for total in 1..=12 {
            for window in 0..=4 {
                for page in 1..=total {
                    let p = compute(page, total, window)?;
                    for n in p.left.iter().chain(p.right.iter()) {
                        assert!((1..=total).contains(n));
                        assert_ne!(page, *n);
                    }
                    assert!(p.left.len() <= window && p.right.len() <= window);
                    assert!(!p.show_first || !p.left.contains(&1));
                    assert!(!p.show_last || !p.right.contains(&total));

                    let m = compute(total + 1 - page, total, window)?;
                    let mirror = |v: &[usize]| -> Vec<usize> {
                        v.iter().rev().map(|n| total + 1 - n).collect()
                    };
                    assert_eq!(mirror(&p.left), m.right);
                    assert_eq!(mirror(&p.right), m.left);
                    assert_eq!(p.show_first, m.show_last);
                    assert_eq!(p.left_has_more, m.right_has_more);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_page_count() -> Result<()> {
        assert_eq!(1, page_count(0, 10)?);
        assert_eq!(1, page_count(10, 10)?);
        assert_eq!(2, page_count(11, 10)?);
        assert_eq!(Err(Error::ZeroPageSize), page_count(3, 0));
        Ok(())
    }
}
