// src/unified_table.rs

use std::collections::HashMap;

use crate::data_loader::TableData;

/// One catalog row; cells line up with the owning table's headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// All loaded sources concatenated into one table with a unioned header list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedTable {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl UnifiedTable {
    /// Outer concatenation: headers are unioned in first-seen order and any cell a
    /// source does not provide is the empty string.
    pub fn concat(parts: Vec<TableData>) -> Self {
        let mut headers: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for part in &parts {
            for header in &part.headers {
                if !positions.contains_key(header) {
                    positions.insert(header.clone(), headers.len());
                    headers.push(header.clone());
                }
            }
        }

        let width = headers.len();
        let mut rows = Vec::with_capacity(parts.iter().map(|p| p.rows.len()).sum());

        for part in parts {
            let mapping: Vec<usize> = part.headers.iter().map(|h| positions[h]).collect();
            for source_row in part.rows {
                let mut cells = vec![String::new(); width];
                for (i, value) in source_row.into_iter().enumerate() {
                    if let Some(&target) = mapping.get(i) {
                        cells[target] = value;
                    }
                }
                rows.push(Row { cells });
            }
        }

        UnifiedTable { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(column, value)` pairs of a row in header order.
    pub fn fields<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(row.cells.iter().map(String::as_str))
    }
}
