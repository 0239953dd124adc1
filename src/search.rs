// src/search.rs

use crate::unified_table::{Row, UnifiedTable};

/// Rows of a table that matched a query, kept in table order.
#[derive(Debug, Clone)]
pub struct MatchSet<'a> {
    table: &'a UnifiedTable,
    indices: Vec<usize>,
}

impl<'a> MatchSet<'a> {
    pub fn empty(table: &'a UnifiedTable) -> Self {
        MatchSet {
            table,
            indices: Vec::new(),
        }
    }

    pub fn headers(&self) -> &'a [String] {
        self.table.headers()
    }

    /// Positions of the matched rows in the table.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a Row> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.rows()[i])
    }

    pub fn get(&self, position: usize) -> Option<&'a Row> {
        self.indices
            .get(position)
            .and_then(|&i| self.table.row(i))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// A query that is empty after trimming means "no search".
pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

/// Case-insensitive substring filter over every cell of every row.
pub fn search<'a>(table: &'a UnifiedTable, query: &str) -> MatchSet<'a> {
    if is_blank(query) {
        return MatchSet::empty(table);
    }

    let needle = query.to_lowercase();
    let indices = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            row.cells()
                .iter()
                .any(|cell| cell.to_lowercase().contains(&needle))
        })
        .map(|(i, _)| i)
        .collect();

    MatchSet { table, indices }
}
