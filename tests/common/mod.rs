#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv_insight::{ColumnTypeSet, Dataset, parse_and_classify};
use tempfile::{TempDir, tempdir};

/// Daily sales with a region label and a row identifier.
pub const SALES_CSV: &str = "\
order_id,order_date,region,units,revenue
1,2024-01-01,North,10,100.5
2,2024-01-02,South,12,120
3,2024-01-03,North,9,95.25
4,2024-01-04,East,15,160
5,2024-01-05,South,11,118
6,2024-01-06,North,14,150
7,2024-02-01,East,20,210
8,2024-02-02,North,18,190
";

/// Three evenly spaced days on an exact line `v = 10 + 10t`.
pub const LINEAR_CSV: &str = "d,v\n2024-01-01,10\n2024-01-02,20\n2024-01-03,30\n";

/// No column looks like a date.
pub const NO_DATE_CSV: &str = "name,score\nalpha,1\nbeta,2\ngamma,3\n";

pub fn load(text: &str) -> (Dataset, ColumnTypeSet) {
    parse_and_classify(text).expect("parse and classify fixture")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }
}
