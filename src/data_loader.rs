// src/data_loader.rs

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Cell values that spreadsheet exports use to mean "no value".
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("could not open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("no columns to parse from file")]
    NoColumns,

    #[error("expected {expected} fields in line {line}, saw {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// One parsed source: header names plus rows aligned to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        TableData { headers, rows }
    }
}

pub trait DataLoader {
    fn load(&self, path: &Path) -> Result<TableData, LoadError>;
}

pub struct CsvLoader;

impl DataLoader for CsvLoader {
    fn load(&self, path: &Path) -> Result<TableData, LoadError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        // Short rows are padded below; long rows are rejected by hand.
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

        let raw_headers = reader.headers()?.clone();
        if raw_headers.is_empty() {
            return Err(LoadError::NoColumns);
        }
        let headers = header_names(&raw_headers);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.len() > headers.len() {
                return Err(LoadError::TooManyFields {
                    line: record.position().map_or(0, |p| p.line()),
                    expected: headers.len(),
                    found: record.len(),
                });
            }

            let mut row: Vec<String> = record.iter().map(normalize_cell).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(TableData::new(headers, rows))
    }
}

/// Parses any source as CSV; the file extension is not consulted.
pub fn load_path(path: &Path) -> Result<TableData, LoadError> {
    CsvLoader.load(path)
}

fn normalize_cell(value: &str) -> String {
    if MISSING_MARKERS.contains(&value) {
        String::new()
    } else {
        value.to_string()
    }
}

/// Blank headers become `Unnamed: <i>`, repeated ones get `.1`, `.2`, ... suffixes.
fn header_names(raw: &csv::StringRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for (i, header) in raw.iter().enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {}", i)
        } else {
            header.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_headers_and_rows_in_order() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "a.csv",
            b"SKU,Description,Price\nA1,Endpoint Security,100\nA2,Network Security,250\n",
        );

        let data = load_path(&path).unwrap();
        assert_eq!(data.headers, vec!["SKU", "Description", "Price"]);
        assert_eq!(
            data.rows,
            vec![
                vec!["A1", "Endpoint Security", "100"],
                vec!["A2", "Network Security", "250"],
            ]
        );
    }

    #[test]
    fn missing_markers_and_short_rows_become_empty() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "a.csv", b"a,b,c\n1,NA,\n2\n");

        let data = load_path(&path).unwrap();
        assert_eq!(data.rows[0], vec!["1", "", ""]);
        assert_eq!(data.rows[1], vec!["2", "", ""]);
    }

    #[test]
    fn long_rows_are_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "a.csv", b"a,b\n1,2\n1,2,3\n");

        match load_path(&path) {
            Err(LoadError::TooManyFields {
                line,
                expected,
                found,
            }) => {
                assert_eq!((line, expected, found), (3, 2, 3));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn blank_and_duplicate_headers_are_renamed() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "a.csv", b"Price,,Price,Price\n1,2,3,4\n");

        let data = load_path(&path).unwrap();
        assert_eq!(
            data.headers,
            vec!["Price", "Unnamed: 1", "Price.1", "Price.2"]
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = load_path(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn empty_file_has_no_columns() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "empty.csv", b"");
        assert!(matches!(load_path(&path), Err(LoadError::NoColumns)));
    }

    #[test]
    fn invalid_utf8_is_a_csv_error() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "bad.csv", b"name\n\xff\xfe\n");
        assert!(matches!(load_path(&path), Err(LoadError::Csv(_))));
    }

    #[test]
    fn whitespace_header_is_kept() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "a.csv", b"SKU,  ,\n1,2,3\n");

        let data = load_path(&path).unwrap();
        assert_eq!(data.headers, vec!["SKU", "  ", "Unnamed: 2"]);
    }

    #[test]
    fn extension_does_not_matter() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "prices.txt", b"SKU,Price\nH1,100\n");

        let data = load_path(&path).unwrap();
        assert_eq!(data.rows, vec![vec!["H1", "100"]]);
        assert!(matches!(
            load_path(&dir.path().join("gone.xlsx")),
            Err(LoadError::NotFound(_))
        ));
    }
}
