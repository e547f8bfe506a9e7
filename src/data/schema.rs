use crate::data::utils::{coerce_float, coerce_int, infer_arrow_dtype_from_str, widen};
use arrow::datatypes::{DataType, Field, Schema};
use serde_json::{Number, Value};

/// Infer one nullable field per header by widening over every non-null cell.
/// `overrides` pins a column's dtype regardless of its content.
pub fn infer_schema(
    headers: &[String],
    rows: &[Vec<Option<String>>],
    overrides: &[(&str, DataType)],
) -> Schema {
    let mut fields = Vec::with_capacity(headers.len());

    for (i, name) in headers.iter().enumerate() {
        if let Some((_, ty)) = overrides.iter().find(|(col, _)| *col == name.as_str()) {
            fields.push(Field::new(name, ty.clone(), true));
            continue;
        }
        let ty = rows
            .iter()
            .filter_map(|r| r.get(i).and_then(|c| c.as_deref()))
            .fold(DataType::Null, |acc, cell| {
                if acc == DataType::Utf8 {
                    acc
                } else {
                    widen(&acc, &infer_arrow_dtype_from_str(cell))
                }
            });
        // a column with no values at all stays textual
        let ty = if ty == DataType::Null { DataType::Utf8 } else { ty };
        fields.push(Field::new(name, ty, true));
    }

    Schema::new(fields)
}

/// Render one cell as JSON according to its column dtype.
pub fn cell_to_json(cell: Option<&str>, ty: &DataType) -> Value {
    let Some(raw) = cell else {
        return Value::Null;
    };
    match ty {
        DataType::Int64 => coerce_int(raw).map(Value::from).unwrap_or(Value::Null),
        DataType::Float64 => float_to_json(coerce_float(raw)),
        _ => Value::String(raw.to_string()),
    }
}

/// `f64` → JSON number; missing or non-finite becomes `null`.
pub fn float_to_json(v: Option<f64>) -> Value {
    v.and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cells(v: &[&str]) -> Vec<Option<String>> {
        v.iter()
            .map(|s| crate::data::utils::null_if_missing(s))
            .collect()
    }

    #[test]
    fn test_infer_schema_widens_per_column() {
        let headers: Vec<String> = ["iso3_code", "year", "value", "notes"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![
            cells(&["FRA", "2019", "10", ""]),
            cells(&["DEU", "2020", "12.5", ""]),
        ];
        let schema = infer_schema(&headers, &rows, &[]);
        assert_eq!(schema.field(0).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(1).data_type(), &DataType::Int64);
        assert_eq!(schema.field(2).data_type(), &DataType::Float64);
        assert_eq!(schema.field(3).data_type(), &DataType::Utf8);

        let pinned = infer_schema(&headers, &rows, &[("value", DataType::Utf8)]);
        assert_eq!(pinned.field(2).data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_cell_to_json() {
        assert_eq!(cell_to_json(Some("2019"), &DataType::Int64), json!(2019));
        assert_eq!(cell_to_json(Some("1.5"), &DataType::Float64), json!(1.5));
        assert_eq!(cell_to_json(Some("3"), &DataType::Float64), json!(3.0));
        assert_eq!(cell_to_json(Some("x"), &DataType::Utf8), json!("x"));
        assert_eq!(cell_to_json(None, &DataType::Utf8), Value::Null);
        assert_eq!(float_to_json(Some(f64::INFINITY)), Value::Null);
    }
}
