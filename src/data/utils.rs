use arrow::datatypes::DataType;
use std::cmp::Ordering;

/// Cell texts read as missing, matching the NA tokens spreadsheet exports
/// and pandas-produced CSVs use.
const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// 1) Map a raw CSV field to `None` when it is one of the NA tokens.
pub fn null_if_missing(raw: &str) -> Option<String> {
    if NULL_TOKENS.contains(&raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

/// 2) Lower-case + trim a header name.
pub fn normalize_column(raw: &str) -> String {
    raw.trim_matches('\u{feff}').trim().to_lowercase()
}

/// 3) Integer coercion: `"2019"` and `"2019.0"` both give 2019, anything else `None`.
pub fn coerce_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// 4) Float coercion; NaN counts as missing.
pub fn coerce_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// 5) Infer the Arrow dtype of a single non-null cell.
pub fn infer_arrow_dtype_from_str(s: &str) -> DataType {
    let s = s.trim();
    if s.parse::<i64>().is_ok() {
        DataType::Int64
    } else if coerce_float(s).is_some() {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}

/// Widen two inferred dtypes to the narrowest type holding both.
pub fn widen(a: &DataType, b: &DataType) -> DataType {
    match (a, b) {
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),
        (DataType::Int64, DataType::Int64) => DataType::Int64,
        (DataType::Int64 | DataType::Float64, DataType::Int64 | DataType::Float64) => {
            DataType::Float64
        }
        _ => DataType::Utf8,
    }
}

/// Order two optional keys with `None` always last, whichever the direction.
pub fn cmp_nulls_last<T: PartialOrd>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Trimmed text, `None` when nothing is left.
pub fn trimmed(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_tokens() {
        assert_eq!(null_if_missing(""), None);
        assert_eq!(null_if_missing("NA"), None);
        assert_eq!(null_if_missing("nan"), None);
        assert_eq!(null_if_missing("Namibia"), Some("Namibia".to_string()));
        // tokens are matched exactly, not after trimming
        assert_eq!(null_if_missing(" NA"), Some(" NA".to_string()));
    }

    #[test]
    fn test_coerce_int() {
        assert_eq!(coerce_int("2019"), Some(2019));
        assert_eq!(coerce_int(" 2019 "), Some(2019));
        assert_eq!(coerce_int("2019.0"), Some(2019));
        assert_eq!(coerce_int("2019.5"), None);
        assert_eq!(coerce_int("n/a"), None);
        assert_eq!(coerce_int(""), None);
    }

    #[test]
    fn test_infer_and_widen() {
        assert_eq!(infer_arrow_dtype_from_str("12"), DataType::Int64);
        assert_eq!(infer_arrow_dtype_from_str("12.5"), DataType::Float64);
        assert_eq!(infer_arrow_dtype_from_str("Africa"), DataType::Utf8);
        assert_eq!(widen(&DataType::Int64, &DataType::Float64), DataType::Float64);
        assert_eq!(widen(&DataType::Null, &DataType::Int64), DataType::Int64);
        assert_eq!(widen(&DataType::Float64, &DataType::Utf8), DataType::Utf8);
    }

    #[test]
    fn test_nulls_sort_last_both_ways() {
        let mut v = vec![Some(1.0), None, Some(3.0), Some(2.0)];
        v.sort_by(|a, b| cmp_nulls_last(*a, *b, true));
        assert_eq!(v, vec![Some(3.0), Some(2.0), Some(1.0), None]);
        v.sort_by(|a, b| cmp_nulls_last(*a, *b, false));
        assert_eq!(v, vec![Some(1.0), Some(2.0), Some(3.0), None]);
    }
}
