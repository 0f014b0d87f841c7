//! Common test utilities for fctrace integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const WIDE_HEADER: &str = "run,type,module,name,attrname,attrvalue,vectime,vecvalue";
pub const ROW_WISE_HEADER: &str = "run,type,module,name,time,value";

/// Run fctrace with the given arguments, returning the full Output.
pub fn run_fctrace<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_fctrace"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run fctrace")
}

/// Builder for a wide (one row per vector) scavetool export.
pub struct WideCsv {
    lines: Vec<String>,
}

impl WideCsv {
    pub fn new() -> Self {
        let mut lines = vec![WIDE_HEADER.to_string()];
        // Scalar and attribute rows are present in real exports and must be ignored.
        lines.push("r0,runattr,,,configname,General,,".to_string());
        lines.push("r0,scalar,Net.host[0].app[0],rcvdPk:count,,,,".to_string());
        Self { lines }
    }

    pub fn vector(mut self, module: &str, name: &str, samples: &[(f64, f64)]) -> Self {
        let times: Vec<String> = samples.iter().map(|(t, _)| t.to_string()).collect();
        let values: Vec<String> = samples.iter().map(|(_, v)| v.to_string()).collect();
        self.lines.push(format!(
            "r0,vector,{module},{name},,,{},{}",
            times.join(" "),
            values.join(" ")
        ));
        self
    }

    /// `count` cumulative-byte flows into host[0]; flow `i` starts at 0.01
    /// and completes after `(i + 1)` milliseconds.
    pub fn flows(mut self, count: usize) -> Self {
        for i in 0..count {
            let end = 0.01 + (i + 1) as f64 * 0.001;
            self = self.vector(
                &format!("Net.host[0].app[{i}]"),
                "rcvdBytes:vector",
                &[(0.0, 0.0), (0.01, 500.0), (end, 1000.0)],
            );
        }
        self
    }

    pub fn build(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        write_file(dir, name, &self.build())
    }
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

/// Read a CSV output file into its header and rows.
pub fn read_table(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut rdr = csv::Reader::from_path(path).expect("Failed to open output table");
    let header = rdr
        .headers()
        .expect("Failed to read header")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = rdr
        .records()
        .map(|r| r.expect("Bad row").iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}

/// Output paths inside a temp dir, as CLI arguments.
pub struct OutPaths {
    pub flows: PathBuf,
    pub summary: PathBuf,
}

impl OutPaths {
    pub fn new(dir: &Path) -> Self {
        let out = dir.join("results");
        Self {
            flows: out.join("fct_flows.csv"),
            summary: out.join("fct_summary.csv"),
        }
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "--out-flows".to_string(),
            self.flows.display().to_string(),
            "--out-summary".to_string(),
            self.summary.display().to_string(),
        ]
    }

    pub fn inventory(&self, input_stem: Option<&str>) -> PathBuf {
        let name = match input_stem {
            Some(stem) => format!("fct_summary_{stem}_inventory.csv"),
            None => "fct_summary_inventory.csv".to_string(),
        };
        self.summary.with_file_name(name)
    }
}
