//! FILENAME: datatable/src/csv.rs
//! PURPOSE: Conversion of tokenized CSV rows into typed values.
//! CONTEXT: Tokenizing raw CSV text is an external collaborator's job; this
//! module only turns already-split text tokens into `Value`s under a
//! supplied column-type list. Parsing policies are deliberate and fixed:
//! numbers parse strictly (`NotANumber` carries the offending text),
//! booleans map case-sensitively "true" -> true and everything else ->
//! false, dates parse leniently and yield null on unparseable text, and
//! timeofday collects numeric components, consuming subsequent tokens when
//! one token holds fewer than three.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{DataError, DataResult};
use crate::table::Table;
use crate::value::{ColumnType, TimeOfDay, Value};

/// Parses a column-type list from its lowercase tokens. Fails with
/// `InvalidType` on the first unknown token, before any row is processed.
pub fn parse_column_types<S: AsRef<str>>(tokens: &[S]) -> DataResult<Vec<ColumnType>> {
    tokens.iter().map(|t| t.as_ref().parse()).collect()
}

/// Strict numeric parse: decimal, signed, scientific notation and
/// `Infinity`/`-Infinity` are accepted; `NaN`, empty and whitespace-only
/// strings are rejected with `NotANumber` carrying the offending text.
pub fn parse_number(text: &str) -> DataResult<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DataError::NotANumber(text.to_string()));
    }
    match trimmed.parse::<f64>() {
        Ok(n) if !n.is_nan() => Ok(n),
        _ => Err(DataError::NotANumber(text.to_string())),
    }
}

/// Permissive boolean policy: exactly "true" maps to true, everything else
/// (including "1", "yes", "True") maps to false. This is a mapping, not a
/// validating parser.
pub fn parse_boolean(text: &str) -> bool {
    text == "true"
}

/// Lenient date parse over a fixed set of shapes. Unparseable text yields
/// null rather than an error.
pub fn parse_date(text: &str) -> Value {
    let trimmed = text.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Value::Date(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Value::Date(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        return Value::Date(dt);
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, format) {
            return Value::Date(d.and_time(NaiveTime::MIN));
        }
    }
    Value::Null
}

/// Converts one tokenized CSV row into typed values per the supplied column
/// types. Only as many tokens as the types demand are consumed; missing
/// tokens become null. A timeofday column consumes additional tokens when
/// the current one yields fewer than three numeric components.
pub fn parse_csv_row<S: AsRef<str>>(raw: &[S], types: &[ColumnType]) -> DataResult<Vec<Value>> {
    let mut values = Vec::with_capacity(types.len());
    let mut pos = 0;
    for &column_type in types {
        if column_type == ColumnType::TimeOfDay {
            let (value, consumed) = parse_time_of_day(&raw[pos.min(raw.len())..])?;
            values.push(value);
            pos += consumed;
            continue;
        }

        let token = raw.get(pos).map(|t| t.as_ref());
        pos += 1;
        let value = match token {
            None => Value::Null,
            Some(text) => match column_type {
                ColumnType::String => Value::String(text.to_string()),
                ColumnType::Number => Value::Number(parse_number(text)?),
                ColumnType::Boolean => Value::Boolean(parse_boolean(text)),
                ColumnType::Date | ColumnType::DateTime => parse_date(text),
                ColumnType::TimeOfDay => unreachable!("handled above"),
            },
        };
        values.push(value);
    }
    Ok(values)
}

/// Collects hour/minute/second and an optional millisecond component,
/// splitting each consumed token on its internal separators. Returns the
/// value and how many tokens were consumed (at least one).
fn parse_time_of_day<S: AsRef<str>>(tokens: &[S]) -> DataResult<(Value, usize)> {
    let mut components: Vec<f64> = Vec::with_capacity(4);
    let mut consumed = 0;
    while components.len() < 3 && consumed < tokens.len() {
        let token = tokens[consumed].as_ref();
        consumed += 1;
        for part in token.split([':', '.']) {
            components.push(parse_number(part)?);
        }
    }
    if consumed == 0 {
        return Ok((Value::Null, 1));
    }
    if components.len() < 3 {
        let text = tokens[..consumed]
            .iter()
            .map(|t| t.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        return Err(DataError::NotANumber(text));
    }
    let hours = components[0] as u32;
    let minutes = components[1] as u32;
    let seconds = components[2] as u32;
    let time = match components.get(3) {
        Some(&ms) => TimeOfDay::with_millis(hours, minutes, seconds, ms as u32),
        None => TimeOfDay::new(hours, minutes, seconds),
    };
    Ok((Value::TimeOfDay(time), consumed))
}

/// Builds a whole table from tokenized CSV rows. Types are validated first
/// and every row is parsed before the table is assembled, so the import is
/// all-or-nothing. With `has_header`, the first row supplies column labels.
pub fn table_from_csv_rows<S: AsRef<str>>(
    rows: &[Vec<S>],
    type_tokens: &[S],
    has_header: bool,
) -> DataResult<Table> {
    let types = parse_column_types(type_tokens)?;

    let mut data_rows = rows;
    let mut labels: Option<&Vec<S>> = None;
    if has_header && !rows.is_empty() {
        labels = Some(&rows[0]);
        data_rows = &rows[1..];
    }

    let mut parsed = Vec::with_capacity(data_rows.len());
    for row in data_rows {
        parsed.push(parse_csv_row(row, &types)?);
    }

    let mut table = Table::from_values(&types, parsed)?;
    if let Some(labels) = labels {
        for (col, label) in labels.iter().take(types.len()).enumerate() {
            table.set_column_label(col, label.as_ref())?;
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DataSource;

    #[test]
    fn test_parse_number_accepted_forms() {
        assert_eq!(parse_number("3.5").unwrap(), 3.5);
        assert_eq!(parse_number("-12").unwrap(), -12.0);
        assert_eq!(parse_number("1.5e3").unwrap(), 1500.0);
        assert_eq!(parse_number("Infinity").unwrap(), f64::INFINITY);
        assert_eq!(parse_number("-Infinity").unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_parse_number_rejections_carry_text() {
        for bad in ["nope", "", "   ", "NaN"] {
            match parse_number(bad) {
                Err(DataError::NotANumber(text)) => assert_eq!(text, bad),
                other => panic!("expected NotANumber for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_boolean_policy_is_case_sensitive_true_only() {
        assert!(parse_boolean("true"));
        for not_true in ["True", "TRUE", "1", "yes", "false", ""] {
            assert!(!parse_boolean(not_true));
        }
    }

    #[test]
    fn test_parse_date_shapes() {
        assert_eq!(
            parse_date("2020-05-01"),
            Value::Date(
                NaiveDate::from_ymd_opt(2020, 5, 1).unwrap().and_time(NaiveTime::MIN)
            )
        );
        assert_eq!(
            parse_date("2020-05-01 10:30:00"),
            Value::Date(
                NaiveDate::from_ymd_opt(2020, 5, 1)
                    .unwrap()
                    .and_hms_opt(10, 30, 0)
                    .unwrap()
            )
        );
        // Unparseable text is null, not an error.
        assert_eq!(parse_date("next tuesday"), Value::Null);
    }

    #[test]
    fn test_parse_csv_row_scenario() {
        // Spec'd scenario: the first two cells parse, the third fails with
        // NotANumber naming the offending text.
        let types = [ColumnType::Number, ColumnType::Boolean, ColumnType::Number];
        let err = parse_csv_row(&["3.5", "true", "nope"], &types).unwrap_err();
        assert_eq!(err, DataError::NotANumber("nope".to_string()));

        let ok = parse_csv_row(&["3.5", "true"], &[ColumnType::Number, ColumnType::Boolean])
            .unwrap();
        assert_eq!(ok, vec![Value::Number(3.5), Value::Boolean(true)]);
    }

    #[test]
    fn test_parse_csv_row_ignores_extra_tokens() {
        let values = parse_csv_row(&["a", "b", "c"], &[ColumnType::String]).unwrap();
        assert_eq!(values, vec![Value::String("a".into())]);
    }

    #[test]
    fn test_parse_csv_row_missing_tokens_are_null() {
        let values = parse_csv_row(&["a"], &[ColumnType::String, ColumnType::Number]).unwrap();
        assert_eq!(values, vec![Value::String("a".into()), Value::Null]);
    }

    #[test]
    fn test_time_of_day_single_token() {
        let values = parse_csv_row(&["10:30:45"], &[ColumnType::TimeOfDay]).unwrap();
        assert_eq!(values, vec![Value::TimeOfDay(TimeOfDay::new(10, 30, 45))]);

        let values = parse_csv_row(&["10:30:45.250"], &[ColumnType::TimeOfDay]).unwrap();
        assert_eq!(
            values,
            vec![Value::TimeOfDay(TimeOfDay::with_millis(10, 30, 45, 250))]
        );
    }

    #[test]
    fn test_time_of_day_spans_tokens() {
        // "10,30,45" tokenizes into three raw cells; the timeofday column
        // consumes all of them, and the next column starts after.
        let values = parse_csv_row(
            &["10", "30", "45", "x"],
            &[ColumnType::TimeOfDay, ColumnType::String],
        )
        .unwrap();
        assert_eq!(
            values,
            vec![
                Value::TimeOfDay(TimeOfDay::new(10, 30, 45)),
                Value::String("x".into()),
            ]
        );
    }

    #[test]
    fn test_time_of_day_bad_component() {
        let err = parse_csv_row(&["10:xx:45"], &[ColumnType::TimeOfDay]).unwrap_err();
        assert_eq!(err, DataError::NotANumber("xx".to_string()));
    }

    #[test]
    fn test_parse_column_types_validates_eagerly() {
        assert_eq!(
            parse_column_types(&["number", "widget"]),
            Err(DataError::InvalidType("widget".to_string()))
        );
    }

    #[test]
    fn test_table_from_csv_rows() {
        let rows = vec![
            vec!["Name", "Score", "Passed"],
            vec!["A", "1.5", "true"],
            vec!["B", "2", "nah"],
        ];
        let table = table_from_csv_rows(&rows, &["string", "number", "boolean"], true).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column_label(2).unwrap(), "Passed");
        assert_eq!(table.value(0, 1).unwrap(), Value::Number(1.5));
        assert_eq!(table.value(1, 2).unwrap(), Value::Boolean(false));
    }

    #[test]
    fn test_table_from_csv_rows_is_all_or_nothing() {
        let rows = vec![vec!["1"], vec!["oops"]];
        assert_eq!(
            table_from_csv_rows(&rows, &["number"], false),
            Err(DataError::NotANumber("oops".to_string()))
        );
    }
}
