//! Historical dataset ingest.
//!
//! The dataset is only read to recover the category vocabulary each label
//! encoder was fitted on. Numeric columns are recorded but not kept.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use sha2::{Digest, Sha256};

use crate::error::DatasetError;

/// Cell values read as missing, the same set pandas treats as NaN by default.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// One retained dataset column.
#[derive(Debug, Clone)]
pub struct DatasetColumn {
    pub name: String,
    pub kind: ColumnKind,
    /// Distinct non-missing values, sorted. Empty for numeric columns.
    pub distinct: BTreeSet<String>,
}

/// Summary of a historical dataset, index columns dropped.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub path: Option<PathBuf>,
    pub columns: Vec<DatasetColumn>,
    pub rows: usize,
    /// Hex SHA-256 of the raw file contents.
    pub sha256: String,
}

#[derive(Default)]
struct ColumnScan {
    non_numeric: bool,
    missing: usize,
    first_missing_line: Option<usize>,
    distinct: BTreeSet<String>,
}

/// Columns written by a dataframe's index rather than holding data.
fn is_index_column(header: &str) -> bool {
    header.is_empty() || header.starts_with("Unnamed: ")
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

impl Dataset {
    /// Reads a dataset from a CSV file with a header row.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        info!("Reading dataset from {:?}", path);
        let bytes = fs::read(path).map_err(|source| DatasetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut dataset = Self::from_bytes(&bytes)?;
        dataset.path = Some(path.to_path_buf());
        Ok(dataset)
    }

    /// Parses CSV content. A column is categorical when any non-missing cell
    /// fails to parse as a number.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new().from_reader(bytes);
        let headers = reader.headers()?.clone();

        let kept: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !is_index_column(h))
            .map(|(i, h)| (i, h.to_string()))
            .collect();
        debug!(
            "Dropped {} index column(s), keeping {}",
            headers.len() - kept.len(),
            kept.len()
        );

        let mut scans: Vec<ColumnScan> = kept.iter().map(|_| ColumnScan::default()).collect();
        let mut rows = 0usize;

        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            // Header is line 1
            let line = idx + 2;
            rows += 1;

            for ((col_idx, _), scan) in kept.iter().zip(scans.iter_mut()) {
                let cell = record.get(*col_idx).unwrap_or("");
                if is_missing(cell) {
                    scan.missing += 1;
                    scan.first_missing_line.get_or_insert(line);
                    continue;
                }
                if cell.parse::<f64>().is_err() {
                    scan.non_numeric = true;
                }
                if !scan.distinct.contains(cell) {
                    scan.distinct.insert(cell.to_string());
                }
            }
        }

        let mut columns = Vec::with_capacity(kept.len());
        for ((_, name), scan) in kept.into_iter().zip(scans) {
            let column = if scan.non_numeric {
                // Missing cells stay out of the vocabulary; real values keep their sorted codes
                if let Some(line) = scan.first_missing_line {
                    warn!(
                        "Column '{}' has {} missing value(s), first on line {}; excluded from its vocabulary",
                        name, scan.missing, line
                    );
                }
                DatasetColumn {
                    name,
                    kind: ColumnKind::Categorical,
                    distinct: scan.distinct,
                }
            } else {
                DatasetColumn {
                    name,
                    kind: ColumnKind::Numeric,
                    distinct: BTreeSet::new(),
                }
            };
            columns.push(column);
        }

        let sha256 = format!("{:x}", Sha256::digest(bytes));
        info!("Dataset read: {} rows, {} columns", rows, columns.len());

        Ok(Self {
            path: None,
            columns,
            rows,
            sha256,
        })
    }

    pub fn column(&self, name: &str) -> Option<&DatasetColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn categorical_columns(&self) -> impl Iterator<Item = &DatasetColumn> {
        self.columns.iter().filter(|c| c.kind == ColumnKind::Categorical)
    }

    /// Fails unless every named column exists and is categorical.
    pub fn require_categorical(&self, names: &[&str]) -> Result<(), DatasetError> {
        for name in names {
            match self.column(name) {
                None => return Err(DatasetError::MissingColumn(name.to_string())),
                Some(c) if c.kind != ColumnKind::Categorical => {
                    return Err(DatasetError::NotCategorical(name.to_string()))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
,struct_typ,occ_type,year_built,no_stories,magnitude,distance
0,W1,RES1,1990,1,5.5,10.2
1,C1,COM1,2001,4,6.1,3.0
2,W1,RES3,1985,2,5.5,NA
";

    #[test]
    fn test_index_column_dropped() {
        let dataset = Dataset::from_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.columns.len(), 6);
        assert_eq!(dataset.columns[0].name, "struct_typ");
        assert_eq!(dataset.rows, 3);
    }

    #[test]
    fn test_column_kinds() {
        let dataset = Dataset::from_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.column("struct_typ").unwrap().kind, ColumnKind::Categorical);
        assert_eq!(dataset.column("year_built").unwrap().kind, ColumnKind::Numeric);
        // Missing cells do not make a numeric column categorical
        assert_eq!(dataset.column("distance").unwrap().kind, ColumnKind::Numeric);

        let occ: Vec<_> = dataset.column("occ_type").unwrap().distinct.iter().cloned().collect();
        assert_eq!(occ, vec!["COM1", "RES1", "RES3"]);
        assert_eq!(dataset.categorical_columns().count(), 2);
    }

    #[test]
    fn test_missing_categorical_value_is_skipped() {
        let csv = "struct_typ,occ_type\nW1,RES1\n,COM1\nC1,RES1\n";
        let dataset = Dataset::from_bytes(csv.as_bytes()).unwrap();
        assert_eq!(dataset.rows, 3);

        let column = dataset.column("struct_typ").unwrap();
        assert_eq!(column.kind, ColumnKind::Categorical);
        let classes: Vec<_> = column.distinct.iter().cloned().collect();
        assert_eq!(classes, vec!["C1", "W1"]);

        let encoder = crate::encoder::LabelEncoder::fit("struct_typ", column.distinct.iter().cloned());
        assert_eq!(encoder.transform("C1").unwrap(), 0);
        assert_eq!(encoder.transform("W1").unwrap(), 1);
        assert!(encoder.transform("").is_err());
    }

    #[test]
    fn test_require_categorical() {
        let dataset = Dataset::from_bytes(SAMPLE.as_bytes()).unwrap();
        assert!(dataset.require_categorical(&["struct_typ", "occ_type"]).is_ok());
        assert!(matches!(
            dataset.require_categorical(&["year_built"]),
            Err(DatasetError::NotCategorical(_))
        ));
        assert!(matches!(
            dataset.require_categorical(&["roof_type"]),
            Err(DatasetError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_hash_is_stable() {
        let a = Dataset::from_bytes(SAMPLE.as_bytes()).unwrap();
        let b = Dataset::from_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(a.sha256, b.sha256);
        assert_eq!(a.sha256.len(), 64);
    }
}
