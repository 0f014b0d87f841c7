//! Loading vector exports into normalised series.
//!
//! The loader reads the whole table once, keeps only vector rows, detects the
//! encoding, and then hands out [`Series`] lazily for whichever entity the
//! caller asks about. Callers never need to know which encoding was present.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::models::{Sample, Series};
use super::schema::{normalize_header, parse_list, parse_scalar, Encoding, Layout};
use crate::config::EntitySelector;
use crate::error::ExtractError;

/// One vector row with only the cells the loader needs.
#[derive(Debug, Clone)]
struct VectorRow {
    entity: String,
    signal: String,
    time: String,
    value: String,
}

/// A loaded trace export.
#[derive(Debug)]
pub struct TraceTable {
    path: PathBuf,
    encoding: Encoding,
    rows: Vec<VectorRow>,
    skipped_rows: usize,
}

impl TraceTable {
    /// Open and load a CSV export.
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        if !path.is_file() {
            return Err(ExtractError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|e| ExtractError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_reader(file, path)
    }

    /// Load a CSV export from any reader. `path` is only used in messages.
    pub fn from_reader<R: Read>(reader: R, path: &Path) -> Result<Self, ExtractError> {
        let read_err = |e: csv::Error| ExtractError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let columns = normalize_header(rdr.headers().map_err(read_err)?.iter());

        let mut records = Vec::new();
        let mut skipped_rows = 0usize;
        for result in rdr.records() {
            match result {
                Ok(record) => records.push(record),
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(read_err(e)),
                Err(e) => {
                    debug!("skipping undecodable row in {}: {e}", path.display());
                    skipped_rows += 1;
                }
            }
        }

        let layout = Layout::detect(&columns, &records).map_err(|missing| {
            ExtractError::MissingColumns {
                path: path.to_path_buf(),
                missing,
                found: columns.clone(),
            }
        })?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records.iter().filter(|r| layout.is_vector_row(r)) {
            let cell = |i: usize| record.get(i).unwrap_or("").trim();
            let entity = cell(layout.module);
            let signal = cell(layout.name);
            if entity.is_empty() || signal.is_empty() {
                skipped_rows += 1;
                continue;
            }
            rows.push(VectorRow {
                entity: entity.to_string(),
                signal: signal.to_string(),
                time: cell(layout.time).to_string(),
                value: cell(layout.value).to_string(),
            });
        }

        debug!(
            "loaded {} vector rows from {} ({} encoding, {} skipped)",
            rows.len(),
            path.display(),
            layout.encoding.as_str(),
            skipped_rows
        );

        Ok(Self {
            path: path.to_path_buf(),
            encoding: layout.encoding,
            rows,
            skipped_rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Number of vector rows kept.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of rows dropped because they could not be decoded or lacked an
    /// entity/signal name.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Whether any vector row belongs to the selected entity.
    pub fn has_entity(&self, selector: &EntitySelector) -> bool {
        self.rows.iter().any(|r| selector.matches(&r.entity))
    }

    /// Series recorded under the selected entity.
    ///
    /// Wide tables yield one series per row; row-wise tables yield one series
    /// per (entity, signal) in order of first appearance. Series are built on
    /// demand as the iterator advances.
    pub fn series<'a>(&'a self, selector: &EntitySelector) -> impl Iterator<Item = Series> + 'a {
        let groups = self.groups(selector);
        groups.into_iter().map(move |indices| self.build_series(&indices))
    }

    /// Row indices of each series for the selected entity.
    fn groups(&self, selector: &EntitySelector) -> Vec<Vec<usize>> {
        let matching = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, r)| selector.matches(&r.entity));

        match self.encoding {
            Encoding::Wide => matching.map(|(i, _)| vec![i]).collect(),
            Encoding::RowWise => {
                let mut order: Vec<Vec<usize>> = Vec::new();
                let mut slot: HashMap<(&str, &str), usize> = HashMap::new();
                for (i, row) in matching {
                    let key = (row.entity.as_str(), row.signal.as_str());
                    let idx = *slot.entry(key).or_insert_with(|| {
                        order.push(Vec::new());
                        order.len() - 1
                    });
                    order[idx].push(i);
                }
                order
            }
        }
    }

    fn build_series(&self, indices: &[usize]) -> Series {
        let first = &self.rows[indices[0]];
        let samples = match self.encoding {
            Encoding::Wide => wide_samples(&first.time, &first.value),
            Encoding::RowWise => indices
                .iter()
                .filter_map(|&i| {
                    let row = &self.rows[i];
                    Some(Sample::new(
                        parse_scalar(&row.time)?,
                        parse_scalar(&row.value)?,
                    ))
                })
                .collect(),
        };
        Series::new(first.entity.as_str(), first.signal.as_str(), samples)
    }
}

/// Pair up the tokens of a wide row; a malformed token on either side drops
/// that position only.
fn wide_samples(time_cell: &str, value_cell: &str) -> Vec<Sample> {
    let times = parse_list(time_cell);
    let values = parse_list(value_cell);
    times
        .into_iter()
        .zip(values)
        .filter_map(|(t, v)| Some(Sample::new(t?, v?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(csv: &str) -> TraceTable {
        TraceTable::from_reader(csv.as_bytes(), Path::new("test.csv")).unwrap()
    }

    const WIDE: &str = "\
run,type,module,name,attrname,attrvalue,vectime,vecvalue
r1,runattr,,,configname,General,,
r1,vector,Net.host[0].app[0],rcvdBytes:vector,,,0 0.1 0.2,0 500 1000
r1,vector,Net.host[0].app[1],rcvdBytes:vector,,,\"0.3 0.1 0.2\",\"30 10 20\"
r1,vector,Net.host[1].app[0],rcvdBytes:vector,,,0 0.1,0 100
r1,scalar,Net.host[0].app[0],rcvdBytes:last,,,,
";

    const ROW_WISE: &str = "\
run,type,module,name,vectime,vecvalue
r1,vector,Net.host[0].app[0],rcvdBytes:vector,0.2,1000
r1,vector,Net.host[0].app[0],rcvdBytes:vector,0.0,0
r1,vector,Net.host[0].app[1],endToEndDelay:vector,0.5,0.001
r1,vector,Net.host[0].app[0],rcvdBytes:vector,0.1,500
r1,vector,Net.host[0].app[0],rcvdBytes:vector,oops,700
r1,vector,Net.host[10].app[0],rcvdBytes:vector,0.1,1
";

    #[test]
    fn test_wide_detected_and_filtered() {
        let table = load(WIDE);
        assert_eq!(table.encoding(), Encoding::Wide);
        // runattr and scalar rows are dropped
        assert_eq!(table.row_count(), 3);

        let series: Vec<Series> = table.series(&EntitySelector::new("host", 0)).collect();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].entity(), "Net.host[0].app[0]");
        assert_eq!(series[0].len(), 3);
        let times: Vec<f64> = series[1].samples().iter().map(|s| s.time).collect();
        assert_eq!(times, vec![0.1, 0.2, 0.3]);
        let values: Vec<f64> = series[1].samples().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_row_wise_groups_and_sorts() {
        let table = load(ROW_WISE);
        assert_eq!(table.encoding(), Encoding::RowWise);

        let series: Vec<Series> = table.series(&EntitySelector::new("host", 0)).collect();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].signal(), "rcvdBytes:vector");
        // malformed time cell dropped, rest sorted
        let samples = series[0].samples();
        assert_eq!(
            samples,
            &[
                Sample::new(0.0, 0.0),
                Sample::new(0.1, 500.0),
                Sample::new(0.2, 1000.0)
            ]
        );
        assert_eq!(series[1].signal(), "endToEndDelay:vector");
    }

    #[test]
    fn test_entity_is_segment_match() {
        let table = load(ROW_WISE);
        assert!(table.has_entity(&EntitySelector::new("host", 10)));
        assert!(!table.has_entity(&EntitySelector::new("host", 1)));
        let series: Vec<Series> = table.series(&EntitySelector::new("host", 10)).collect();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_time_value_columns_case_insensitive() {
        let table = load("Module,Name,Time,Value\nN.host[0].app[0],rcvdBytes:vector,0.1,5\n");
        assert_eq!(table.encoding(), Encoding::RowWise);
        let series: Vec<Series> = table.series(&EntitySelector::default()).collect();
        assert_eq!(series[0].samples(), &[Sample::new(0.1, 5.0)]);
    }

    #[test]
    fn test_wide_malformed_tokens_dropped_pairwise() {
        let csv = "type,module,name,vectime,vecvalue\n\
                   vector,N.host[0].app[0],rcvdBytes:vector,\"{0, x, 0.2, 0.3}\",\"{0, 10, bad, 30}\"\n";
        let table = load(csv);
        let series: Vec<Series> = table.series(&EntitySelector::default()).collect();
        assert_eq!(
            series[0].samples(),
            &[Sample::new(0.0, 0.0), Sample::new(0.3, 30.0)]
        );
    }

    #[test]
    fn test_wide_empty_series_is_kept() {
        let csv = "type,module,name,vectime,vecvalue\n\
                   vector,N.host[0].app[0],rcvdBytes:vector,\"0 1\",\"0 1\"\n\
                   vector,N.host[0].app[1],rcvdBytes:vector,nan,nan\n";
        let table = load(csv);
        let series: Vec<Series> = table.series(&EntitySelector::default()).collect();
        assert_eq!(series.len(), 2);
        assert!(series[1].is_empty());
    }

    #[test]
    fn test_undecodable_row_skipped_and_counted() {
        let mut csv = b"type,module,name,vectime,vecvalue\n\
vector,N.host[0].app[0],rcvdBytes:vector,0 1,0 10\n"
            .to_vec();
        csv.extend_from_slice(b"vector,N.host[0].app[1],rcvd\xff\xfeBytes,0 1,0 10\n");
        csv.extend_from_slice(b"vector,N.host[0].app[2],rcvdBytes:vector,0 2,0 20\n");

        let table = TraceTable::from_reader(csv.as_slice(), Path::new("bad.csv")).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.skipped_rows(), 1);
        let entities: Vec<String> = table
            .series(&EntitySelector::default())
            .map(|s| s.entity().to_string())
            .collect();
        assert_eq!(entities, vec!["N.host[0].app[0]", "N.host[0].app[2]"]);
    }

    #[test]
    fn test_infinite_tokens_dropped() {
        let csv = "type,module,name,vectime,vecvalue\n\
                   vector,N.host[0].app[0],endToEndDelay:vector,0.1 inf,0.01 0.02\n\
                   vector,N.host[0].app[1],endToEndDelay:vector,0.2 1e400 0.4,0.01 0.02 0.03\n";
        let table = load(csv);
        let series: Vec<Series> = table.series(&EntitySelector::default()).collect();
        assert_eq!(series[0].samples(), &[Sample::new(0.1, 0.01)]);
        assert_eq!(
            series[1].samples(),
            &[Sample::new(0.2, 0.01), Sample::new(0.4, 0.03)]
        );
    }

    #[test]
    fn test_missing_columns_error() {
        let err = TraceTable::from_reader("run,type,name\n".as_bytes(), Path::new("x.csv"))
            .unwrap_err();
        match err {
            ExtractError::MissingColumns { missing, .. } => {
                assert!(missing.contains(&"module"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_open_missing_file() {
        let err = TraceTable::open(Path::new("/nonexistent/vectors.csv")).unwrap_err();
        assert!(matches!(err, ExtractError::InputNotFound { .. }));
    }
}
