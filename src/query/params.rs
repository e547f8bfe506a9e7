use std::ops::Range;

/// Raw query-string pairs in arrival order.
pub type QueryPairs = [(String, String)];

/// First value supplied for `key`, if any.
pub fn first<'a>(pairs: &'a QueryPairs, key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Parse a signed integer, or hand back `default` on anything unparsable.
/// Bad pagination input is never an error.
pub fn parse_or_default(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

/// Same as [`parse_or_default`] when the default itself may be absent.
pub fn parse_or(raw: Option<&str>, default: Option<i64>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).or(default)
}

/// Index range selected by the slice `[start:stop]` over `len` items.
/// Negative bounds count from the end, out-of-range bounds clamp.
pub fn slice_range(len: usize, start: i64, stop: i64) -> Range<usize> {
    let len_i = len as i64;
    let clamp = |i: i64| -> usize {
        let i = if i < 0 { i.saturating_add(len_i) } else { i };
        i.clamp(0, len_i) as usize
    };
    let (start, stop) = (clamp(start), clamp(stop));
    if stop <= start {
        start..start
    } else {
        start..stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(v: &[(&str, &str)]) -> Vec<(String, String)> {
        v.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_or_default(Some("15"), 200), 15);
        assert_eq!(parse_or_default(Some(" 15 "), 200), 15);
        assert_eq!(parse_or_default(Some("-3"), 200), -3);
        assert_eq!(parse_or_default(Some("abc"), 200), 200);
        assert_eq!(parse_or_default(Some("1.5"), 200), 200);
        assert_eq!(parse_or_default(Some(""), 0), 0);
        assert_eq!(parse_or_default(None, 20), 20);
        assert_eq!(parse_or(Some("x"), None), None);
        assert_eq!(parse_or(Some("2019"), None), Some(2019));
    }

    #[test]
    fn test_first_value_wins() {
        let p = pairs(&[("year", "2019"), ("q", "fr"), ("year", "2020")]);
        assert_eq!(first(&p, "year"), Some("2019"));
        assert_eq!(first(&p, "limit"), None);
    }

    #[test]
    fn test_slice_range() {
        assert_eq!(slice_range(10, 0, 200), 0..10);
        assert_eq!(slice_range(10, 4, 6), 4..6);
        assert_eq!(slice_range(10, 12, 20), 10..10);
        assert_eq!(slice_range(10, -3, 197), 7..10);
        assert_eq!(slice_range(10, 0, -2), 0..8);
        assert_eq!(slice_range(10, 0, -20), 0..0);
        assert_eq!(slice_range(0, 0, 5), 0..0);
        assert_eq!(slice_range(10, i64::MIN, i64::MAX), 0..10);
    }
}
