use crate::error::DatasetError;
use crate::row::Row;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The immutable, ordered row sequence the cursor rotates over.
#[derive(Debug)]
pub struct Dataset {
    source: PathBuf,
    columns: Arc<[String]>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Load a CSV file. The first record is the header; blank lines are
    /// skipped and every data record must match the header width.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let data = match std::fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DatasetError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        Self::parse(path, &data)
    }

    /// Parse CSV text; `source` is only used for error messages.
    pub fn parse(source: &Path, data: &str) -> Result<Self, DatasetError> {
        let data = data.strip_prefix('\u{feff}').unwrap_or(data);
        if data.trim().is_empty() {
            return Err(DatasetError::Empty(source.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_bytes());

        let header = reader.headers()?.clone();
        if header.is_empty() {
            return Err(DatasetError::Empty(source.to_path_buf()));
        }
        let mut seen = HashSet::new();
        for (i, name) in header.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(DatasetError::BlankColumn(i));
            }
            if !seen.insert(name) {
                return Err(DatasetError::DuplicateColumn(name.to_string()));
            }
        }
        let columns: Arc<[String]> = header.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() == 1 && record[0].trim().is_empty() {
                continue;
            }
            if record.len() != columns.len() {
                return Err(DatasetError::InconsistentColumns {
                    line: record.position().map(|p| p.line()).unwrap_or(0),
                    expected: columns.len(),
                    found: record.len(),
                });
            }
            rows.push(Row::new(
                Arc::clone(&columns),
                record.iter().map(str::to_string).collect(),
            ));
        }

        if rows.is_empty() {
            return Err(DatasetError::NoRows(source.to_path_buf()));
        }

        Ok(Self {
            source: source.to_path_buf(),
            columns,
            rows,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Row at `index` modulo the dataset length. A loaded dataset always has
    /// at least one row.
    pub(crate) fn row_wrapping(&self, index: usize) -> &Row {
        &self.rows[index % self.rows.len()]
    }
}
