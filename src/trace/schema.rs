//! Table layout detection for vector exports.
//!
//! Two encodings are recognised:
//!
//! - **Wide**: one row per series; `vectime`/`vecvalue` cells hold the whole
//!   sample list (`"0.1 0.2 0.3"`, `"{0.1,0.2}"`, ...).
//! - **Row-wise**: one row per sample; the time and value cells are scalars and
//!   rows sharing (module, name) form one series.
//!
//! Detection is a pure function of the normalised header and the cells, run
//! once per input before any series is built.

use csv::StringRecord;
use serde::Serialize;

use super::constants::{
    COL_MODULE, COL_NAME, COL_TIME, COL_TYPE, COL_VALUE, COL_VECTIME, COL_VECVALUE,
    VECTOR_ROW_TYPE,
};

/// How samples are laid out in the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    Wide,
    RowWise,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wide => "wide",
            Self::RowWise => "row-wise",
        }
    }
}

/// Column positions of a recognised table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub encoding: Encoding,
    /// Row type tag column; without one every row is a vector row.
    pub row_type: Option<usize>,
    pub module: usize,
    pub name: usize,
    pub time: usize,
    pub value: usize,
}

/// Trim and lower-case header names.
pub fn normalize_header<'a, I>(header: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    header
        .into_iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
        .collect()
}

fn position(columns: &[String], name: &str) -> Option<usize> {
    columns.iter().position(|c| c == name)
}

fn is_vector_record(row_type: Option<usize>, record: &StringRecord) -> bool {
    row_type
        .and_then(|i| record.get(i))
        .map_or(true, |t| t.trim().eq_ignore_ascii_case(VECTOR_ROW_TYPE))
}

impl Layout {
    /// Resolve column positions from a normalised header.
    ///
    /// `records` are the data rows of the table; the time cells of vector rows
    /// are only consulted when the `vectime`/`vecvalue` pair is present, to
    /// tell a list-valued export from a scalar one. On failure the names of
    /// the missing columns are returned.
    pub fn detect<'a, I>(columns: &[String], records: I) -> Result<Self, Vec<&'static str>>
    where
        I: IntoIterator<Item = &'a StringRecord>,
    {
        let module = position(columns, COL_MODULE);
        let name = position(columns, COL_NAME);
        let row_type = position(columns, COL_TYPE);

        let list_pair = position(columns, COL_VECTIME).zip(position(columns, COL_VECVALUE));
        let flat_pair = position(columns, COL_TIME).zip(position(columns, COL_VALUE));

        let (module, name, (time, value)) = match (module, name, list_pair.or(flat_pair)) {
            (Some(m), Some(n), Some(pair)) => (m, n, pair),
            (m, n, pair) => {
                let mut missing = Vec::new();
                if m.is_none() {
                    missing.push(COL_MODULE);
                }
                if n.is_none() {
                    missing.push(COL_NAME);
                }
                if pair.is_none() {
                    missing.push(COL_VECTIME);
                    missing.push(COL_VECVALUE);
                }
                return Err(missing);
            }
        };

        let encoding = if list_pair.is_some() {
            classify_time_cells(
                records
                    .into_iter()
                    .filter(|r| is_vector_record(row_type, r))
                    .filter_map(|r| r.get(time)),
            )
        } else {
            Encoding::RowWise
        };

        Ok(Self {
            encoding,
            row_type,
            module,
            name,
            time,
            value,
        })
    }

    /// Whether a data row carries samples (`type` is `vector`, or there is no
    /// `type` column).
    pub fn is_vector_row(&self, record: &StringRecord) -> bool {
        is_vector_record(self.row_type, record)
    }
}

/// A table is wide when any time cell holds more than one token.
pub fn classify_time_cells<'a, I>(time_cells: I) -> Encoding
where
    I: IntoIterator<Item = &'a str>,
{
    let wide = time_cells
        .into_iter()
        .any(|cell| split_tokens(cell).nth(1).is_some());
    if wide {
        Encoding::Wide
    } else {
        Encoding::RowWise
    }
}

/// Split a list-valued cell into tokens.
///
/// Enclosing brace/bracket/parenthesis characters are stripped from the cell
/// and from every token; separators are whitespace, comma and semicolon.
pub fn split_tokens(cell: &str) -> impl Iterator<Item = &str> {
    cell.trim()
        .trim_start_matches(['{', '[', '('])
        .trim_end_matches(['}', ']', ')'])
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .map(|t| t.trim_matches(['{', '}', '[', ']', '(', ')']))
        .filter(|t| !t.is_empty())
}

/// Parse one token. Infinite or out-of-range values and NaN are holes.
fn parse_token(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse every token of a list cell; malformed tokens become `None` so that
/// time and value lists stay aligned position by position.
pub fn parse_list(cell: &str) -> Vec<Option<f64>> {
    split_tokens(cell).map(parse_token).collect()
}

/// Parse a scalar cell, tolerating the same decoration as list cells.
pub fn parse_scalar(cell: &str) -> Option<f64> {
    let mut tokens = split_tokens(cell);
    let first = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    parse_token(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        normalize_header(names.iter().copied())
    }

    fn records(rows: &[&[&str]]) -> Vec<StringRecord> {
        rows.iter().map(|r| StringRecord::from(r.to_vec())).collect()
    }

    #[test]
    fn test_normalize_header() {
        let cols = header(&[" Run", "TYPE ", "\u{feff}module", "Name"]);
        assert_eq!(cols, vec!["run", "type", "module", "name"]);
    }

    #[test]
    fn test_detect_wide() {
        let cols = header(&["run", "type", "module", "name", "vectime", "vecvalue"]);
        let rows = records(&[
            &["r", "vector", "N.host[0]", "a", "0.1 0.2 0.3", "1 2 3"],
            &["r", "vector", "N.host[0]", "b", "", ""],
        ]);
        let layout = Layout::detect(&cols, &rows).unwrap();
        assert_eq!(layout.encoding, Encoding::Wide);
        assert_eq!(layout.time, 4);
        assert_eq!(layout.value, 5);
        assert_eq!(layout.row_type, Some(1));
    }

    #[test]
    fn test_detect_scalar_vectime_is_row_wise() {
        let cols = header(&["run", "type", "module", "name", "vectime", "vecvalue"]);
        let rows = records(&[
            &["r", "vector", "N.host[0]", "a", "0.1", "1"],
            &["r", "vector", "N.host[0]", "a", "0.2", "2"],
        ]);
        let layout = Layout::detect(&cols, &rows).unwrap();
        assert_eq!(layout.encoding, Encoding::RowWise);
    }

    #[test]
    fn test_detect_ignores_non_vector_rows() {
        let cols = header(&["run", "type", "module", "name", "vectime", "vecvalue"]);
        let rows = records(&[
            &["r", "runattr", "", "", "a b", ""],
            &["r", "vector", "N.host[0]", "a", "0.1", "1"],
        ]);
        let layout = Layout::detect(&cols, &rows).unwrap();
        assert_eq!(layout.encoding, Encoding::RowWise);
        assert!(!layout.is_vector_row(&rows[0]));
        assert!(layout.is_vector_row(&rows[1]));
    }

    #[test]
    fn test_every_row_is_vector_without_type_column() {
        let cols = header(&["module", "name", "vectime", "vecvalue"]);
        let rows = records(&[&["N.host[0]", "a", "0 1", "0 1"]]);
        let layout = Layout::detect(&cols, &rows).unwrap();
        assert_eq!(layout.row_type, None);
        assert_eq!(layout.encoding, Encoding::Wide);
        assert!(layout.is_vector_row(&rows[0]));
    }

    #[test]
    fn test_detect_time_value_columns() {
        let cols = header(&["module", "name", "time", "value"]);
        let layout = Layout::detect(&cols, &Vec::<StringRecord>::new()).unwrap();
        assert_eq!(layout.encoding, Encoding::RowWise);
        assert_eq!(layout.row_type, None);
        assert_eq!((layout.time, layout.value), (2, 3));
    }

    #[test]
    fn test_detect_missing_columns() {
        let cols = header(&["run", "name", "vectime"]);
        let missing = Layout::detect(&cols, &Vec::<StringRecord>::new()).unwrap_err();
        assert_eq!(missing, vec![COL_MODULE, COL_VECTIME, COL_VECVALUE]);
    }

    #[test]
    fn test_split_tokens_separators_and_braces() {
        let tokens: Vec<&str> = split_tokens("{0.1, 0.2;0.3  0.4}").collect();
        assert_eq!(tokens, vec!["0.1", "0.2", "0.3", "0.4"]);
        let tokens: Vec<&str> = split_tokens("[1 2]").collect();
        assert_eq!(tokens, vec!["1", "2"]);
        assert_eq!(split_tokens("  ").count(), 0);
    }

    #[test]
    fn test_parse_list_keeps_holes() {
        assert_eq!(
            parse_list("1 x 3"),
            vec![Some(1.0), None, Some(3.0)]
        );
    }

    #[test]
    fn test_non_finite_tokens_are_holes() {
        assert_eq!(
            parse_list("0.1 inf -infinity 1e400 nan 0.2"),
            vec![Some(0.1), None, None, None, None, Some(0.2)]
        );
        assert_eq!(parse_scalar("inf"), None);
        assert_eq!(parse_scalar("1e400"), None);
        assert_eq!(parse_scalar("NaN"), None);
    }

    #[test]
    fn test_parse_scalar() {
        assert_eq!(parse_scalar(" 0.25 "), Some(0.25));
        assert_eq!(parse_scalar("{7}"), Some(7.0));
        assert_eq!(parse_scalar("abc"), None);
        assert_eq!(parse_scalar("1 2"), None);
        assert_eq!(parse_scalar(""), None);
    }
}
