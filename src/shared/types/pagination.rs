//! Page window coercion and the uniform page result.
//!
//! List endpoints receive `page` / `per_page` as raw query-string values.
//! Malformed input is never an error: it is coerced to a usable window.

/// `per_page` used when the caller sends nothing usable
pub const DEFAULT_PER_PAGE: u64 = 10;

/// How an out-of-range `per_page` is coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerPagePolicy {
    /// Missing, non-numeric or zero → default; negative → 1; above cap → cap.
    Clamp { cap: u64 },
    /// Anything outside `1..=cap` → default.
    Reset { cap: u64 },
}

impl PerPagePolicy {
    /// Regular list endpoints
    pub const LIST: Self = PerPagePolicy::Clamp { cap: 100 };
    /// Exact-count report
    pub const REPORT: Self = PerPagePolicy::Reset { cap: 200 };

    fn coerce(self, raw: Option<i64>) -> u64 {
        match self {
            PerPagePolicy::Clamp { cap } => match raw {
                None | Some(0) => DEFAULT_PER_PAGE.min(cap),
                Some(n) if n < 0 => 1,
                Some(n) => (n as u64).min(cap),
            },
            PerPagePolicy::Reset { cap } => match raw {
                Some(n) if n >= 1 && (n as u64) <= cap => n as u64,
                _ => DEFAULT_PER_PAGE.min(cap),
            },
        }
    }
}

/// A validated page window (`page >= 1`, `per_page >= 1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Build a window from raw query-string values.
    pub fn from_query(page: Option<&str>, per_page: Option<&str>, policy: PerPagePolicy) -> Self {
        let page = match parse_leading_int(page) {
            Some(n) if n >= 1 => n as u64,
            _ => 1,
        };
        Self {
            page,
            per_page: policy.coerce(parse_leading_int(per_page)),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.per_page)
            .min(i64::MAX as u64)
    }
}

/// Integer prefix of `raw` (after leading whitespace and an optional sign),
/// `None` when there are no digits. `"12abc"` parses as 12.
pub fn parse_leading_int(raw: Option<&str>) -> Option<i64> {
    let s = raw?.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    rest[..digits_len].parse::<i64>().ok().map(|n| n * sign)
}

/// A fixed set of sort keys accepted from the query string.
///
/// Unknown keys fall back to [`Default`] instead of failing.
pub trait SortKey: Sized + Copy + Default {
    fn parse(raw: &str) -> Option<Self>;

    fn from_query(raw: Option<&str>) -> Self {
        raw.map(str::trim)
            .and_then(Self::parse)
            .unwrap_or_default()
    }
}

/// One page of rows plus the total across all pages
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub rows: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResult<T> {
    pub fn new(rows: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            rows,
            total,
            page: request.page,
            per_page: request.per_page,
            total_pages: total_pages(total, request.per_page),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            rows: self.rows.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

/// `max(1, ceil(total / per_page))`
pub fn total_pages(total: u64, per_page: u64) -> u64 {
    total.div_ceil(per_page.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(page: Option<&str>, per_page: Option<&str>) -> PageRequest {
        PageRequest::from_query(page, per_page, PerPagePolicy::LIST)
    }

    fn report(per_page: Option<&str>) -> PageRequest {
        PageRequest::from_query(None, per_page, PerPagePolicy::REPORT)
    }

    #[test]
    fn missing_values_use_defaults() {
        assert_eq!(list(None, None), PageRequest::new(1, 10));
        assert_eq!(report(None), PageRequest::new(1, 10));
    }

    #[test]
    fn garbage_values_use_defaults() {
        assert_eq!(list(Some("abc"), Some("")), PageRequest::new(1, 10));
        assert_eq!(list(Some("-3"), Some("x10")), PageRequest::new(1, 10));
    }

    #[test]
    fn zero_per_page_never_divides_by_zero() {
        let req = list(None, Some("0"));
        assert_eq!(req.per_page, 10);
        assert_eq!(total_pages(0, req.per_page), 1);

        let req = report(Some("0"));
        assert_eq!(req.per_page, 10);
    }

    #[test]
    fn list_policy_clamps_to_cap_and_floor() {
        assert_eq!(list(None, Some("500")).per_page, 100);
        assert_eq!(list(None, Some("-5")).per_page, 1);
        assert_eq!(list(None, Some("25")).per_page, 25);
    }

    #[test]
    fn report_policy_resets_out_of_range() {
        assert_eq!(report(Some("200")).per_page, 200);
        assert_eq!(report(Some("201")).per_page, 10);
        assert_eq!(report(Some("-1")).per_page, 10);
    }

    #[test]
    fn leading_integer_prefix_is_accepted() {
        assert_eq!(parse_leading_int(Some(" 12abc")), Some(12));
        assert_eq!(parse_leading_int(Some("+7")), Some(7));
        assert_eq!(parse_leading_int(Some("-")), None);
        assert_eq!(parse_leading_int(Some("99999999999999999999")), None);
        assert_eq!(parse_leading_int(None), None);
    }

    #[test]
    fn offset_follows_page_and_size() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
        assert_eq!(PageRequest::new(u64::MAX, 100).offset(), i64::MAX as u64);
    }

    #[test]
    fn total_pages_has_floor_of_one() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
    }

    #[test]
    fn result_reports_window() {
        let result = PaginatedResult::new(vec![1, 2, 3, 4, 5], 25, PageRequest::new(3, 10));
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.page, 3);
        let mapped = result.map(|n| n * 2);
        assert_eq!(mapped.rows, vec![2, 4, 6, 8, 10]);
        assert_eq!(mapped.total, 25);
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    enum Order {
        #[default]
        Up,
        Down,
    }

    impl SortKey for Order {
        fn parse(raw: &str) -> Option<Self> {
            match raw {
                "up" => Some(Order::Up),
                "down" => Some(Order::Down),
                _ => None,
            }
        }
    }

    #[test]
    fn unknown_sort_key_falls_back_to_default() {
        assert_eq!(Order::from_query(Some(" down ")), Order::Down);
        assert_eq!(Order::from_query(Some("sideways")), Order::Up);
        assert_eq!(Order::from_query(None), Order::Up);
    }
}
