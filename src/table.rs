use std::collections::HashSet;

use itertools::Itertools;

use crate::ast::VariableName;
use crate::term::Term;

pub type Row = Vec<Term>;

/// A relation of variable bindings: ordered column names and duplicate-free
/// rows of the same arity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindingTable {
    columns: Vec<VariableName>,
    rows: Vec<Row>,
}

impl BindingTable {
    pub fn empty(columns: Vec<VariableName>) -> Self {
        Self {
            columns,
            rows: vec![],
        }
    }

    /// No columns, one row: the identity of the natural join.
    pub fn unit() -> Self {
        Self {
            columns: vec![],
            rows: vec![vec![]],
        }
    }

    pub fn columns(&self) -> &[VariableName] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn bindings(&self) -> impl Iterator<Item = Binding<'_>> {
        self.rows.iter().map(move |row| Binding {
            columns: &self.columns,
            row,
        })
    }

    /// Natural join on the shared column names; a Cartesian product when
    /// there are none. Columns of `self` come first, followed by the
    /// remaining columns of `other` in their original order.
    pub fn join(&self, other: &BindingTable) -> BindingTable {
        let shared: Vec<(usize, usize)> = self
            .columns
            .iter()
            .enumerate()
            .filter_map(|(i, column)| other.column_index(column).map(|j| (i, j)))
            .collect();
        let extra: Vec<usize> = (0..other.columns.len())
            .filter(|j| shared.iter().all(|&(_, k)| k != *j))
            .collect();

        let columns = self
            .columns
            .iter()
            .cloned()
            .chain(extra.iter().map(|&j| other.columns[j].clone()))
            .collect();
        let mut builder = BindingTableBuilder::new(columns);
        for (left, right) in self.rows.iter().cartesian_product(other.rows.iter()) {
            if shared.iter().all(|&(i, j)| left[i] == right[j]) {
                builder.push_row(
                    left.iter()
                        .cloned()
                        .chain(extra.iter().map(|&j| right[j].clone()))
                        .collect(),
                );
            }
        }
        builder.build()
    }

    /// Keeps the rows satisfying `predicate`, with the same columns.
    pub fn filter(&self, mut predicate: impl FnMut(&Binding<'_>) -> bool) -> BindingTable {
        let rows = self
            .bindings()
            .filter(|binding| predicate(binding))
            .map(|binding| binding.row.to_vec())
            .collect();
        BindingTable {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Drops `column`, deduplicating rows that become equal.
    pub fn without_column(&self, column: &str) -> BindingTable {
        let Some(index) = self.column_index(column) else {
            return self.clone();
        };
        let mut columns = self.columns.clone();
        columns.remove(index);
        let mut builder = BindingTableBuilder::new(columns);
        for row in &self.rows {
            let mut row = row.clone();
            row.remove(index);
            builder.push_row(row);
        }
        builder.build()
    }
}

/// One row of a table, addressable by column name.
#[derive(Clone, Copy, Debug)]
pub struct Binding<'a> {
    columns: &'a [VariableName],
    row: &'a [Term],
}

impl<'a> Binding<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Term> {
        let index = self.columns.iter().position(|name| name == column)?;
        self.row.get(index)
    }

    pub fn row(&self) -> &'a [Term] {
        self.row
    }
}

/// Append-only construction of a [`BindingTable`]. Duplicate rows are
/// ignored.
#[derive(Debug)]
pub struct BindingTableBuilder {
    columns: Vec<VariableName>,
    rows: Vec<Row>,
    seen: HashSet<Row>,
}

impl BindingTableBuilder {
    pub fn new(columns: Vec<VariableName>) -> Self {
        Self {
            columns,
            rows: vec![],
            seen: HashSet::new(),
        }
    }

    pub fn columns(&self) -> &[VariableName] {
        &self.columns
    }

    /// Returns whether the row was new. A row must bind every column.
    pub fn push_row(&mut self, row: Row) -> bool {
        assert_eq!(
            row.len(),
            self.columns.len(),
            "row arity does not match columns {:?}",
            self.columns
        );
        if !self.seen.insert(row.clone()) {
            return false;
        }
        self.rows.push(row);
        true
    }

    pub fn build(self) -> BindingTable {
        BindingTable {
            columns: self.columns,
            rows: self.rows,
        }
    }
}
