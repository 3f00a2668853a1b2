#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::{TempDir, tempdir};

/// Small order table exercising every KPI, distribution and insight.
pub const SALES_CSV: &str = "\
Order ID,Order Date,Customer ID,Product,Product ID,Category,Quantity,Unit Price,Total Amount,Cost,Region,Salesperson,Payment Method,Discount
1001,2024-01-05,C1,Pen,P1,Office,4,2.5,10,1.5,East,Alice,Card,1
1002,2024-01-20,C2,Notebook,P2,Office,2,20,40,12,West,Bob,Cash,0
1003,2024-02-03,C1,Pen,P1,Office,3,2.5,7.5,1.5,East,Alice,Card,0.5
1004,2024-02-17,C3,Desk,P3,Furniture,1,250,250,180,East,Carol,Transfer,10
1005,2024-03-09,C4,Chair,P4,Furniture,2,90,180,60,West,Bob,Card,0
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes raw bytes, for inputs in legacy encodings.
    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, contents).expect("write temp bytes");
        path
    }
}

/// Fixed processing time for deterministic future-date checks and report headers.
pub fn as_of(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
}
