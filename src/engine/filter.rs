use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::kana::table::{self, Column, Kana, Row, TABLE};

/// What subset of the table gets drilled. Parameters live inside the
/// variant, so a row selection can never coexist with column mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SelectionMode {
    #[default]
    All,
    Row(BTreeSet<Row>),
    Column(BTreeSet<Column>),
    /// Hand-picked subset, kept in the order it was built up.
    Custom(Vec<&'static Kana>),
    Dakuon,
}

/// The tag of a `SelectionMode` without its parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    All,
    Dakuon,
    Row,
    Column,
    Custom,
}

impl ModeKind {
    /// Order shown in the settings picker.
    pub const CYCLE: [ModeKind; 5] = [
        ModeKind::All,
        ModeKind::Dakuon,
        ModeKind::Row,
        ModeKind::Column,
        ModeKind::Custom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ModeKind::All => "All kana",
            ModeKind::Dakuon => "Dakuon / handakuon",
            ModeKind::Row => "By row",
            ModeKind::Column => "By column",
            ModeKind::Custom => "Custom",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::CYCLE.iter().position(|&m| m == self).unwrap_or(0);
        Self::CYCLE[(idx + 1) % Self::CYCLE.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::CYCLE.iter().position(|&m| m == self).unwrap_or(0);
        Self::CYCLE[(idx + Self::CYCLE.len() - 1) % Self::CYCLE.len()]
    }
}

impl SelectionMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            SelectionMode::All => ModeKind::All,
            SelectionMode::Row(_) => ModeKind::Row,
            SelectionMode::Column(_) => ModeKind::Column,
            SelectionMode::Custom(_) => ModeKind::Custom,
            SelectionMode::Dakuon => ModeKind::Dakuon,
        }
    }

    /// Records matching this mode, in table order except for `Custom`,
    /// which is returned verbatim.
    pub fn filter(&self) -> Vec<&'static Kana> {
        match self {
            SelectionMode::All => TABLE.iter().collect(),
            SelectionMode::Dakuon => TABLE.iter().filter(|k| k.row.is_diacritic()).collect(),
            SelectionMode::Row(rows) => TABLE.iter().filter(|k| rows.contains(&k.row)).collect(),
            SelectionMode::Column(columns) => TABLE
                .iter()
                .filter(|k| columns.contains(&k.column))
                .collect(),
            SelectionMode::Custom(subset) => subset.clone(),
        }
    }

    pub fn toggle_row(&mut self, row: Row) -> bool {
        match self {
            SelectionMode::Row(rows) => {
                if !rows.remove(&row) {
                    rows.insert(row);
                }
                true
            }
            _ => false,
        }
    }

    pub fn toggle_column(&mut self, column: Column) -> bool {
        match self {
            SelectionMode::Column(columns) => {
                if !columns.remove(&column) {
                    columns.insert(column);
                }
                true
            }
            _ => false,
        }
    }

    /// Click semantics: remove by key when present, otherwise append.
    pub fn toggle_custom(&mut self, kana: &'static Kana) -> bool {
        match self {
            SelectionMode::Custom(subset) => {
                if let Some(pos) = subset.iter().position(|k| k.key() == kana.key()) {
                    subset.remove(pos);
                } else {
                    subset.push(kana);
                }
                true
            }
            _ => false,
        }
    }

    /// Drag semantics: union with the existing subset, never removing.
    /// The merged subset is put back into table order.
    pub fn add_custom<I>(&mut self, added: I) -> bool
    where
        I: IntoIterator<Item = &'static Kana>,
    {
        match self {
            SelectionMode::Custom(subset) => {
                let mut keys: BTreeSet<usize> = subset.iter().map(|k| table::table_index(k)).collect();
                let before = keys.len();
                keys.extend(added.into_iter().map(table::table_index));
                if keys.len() != before {
                    *subset = keys
                        .into_iter()
                        .filter_map(|idx| TABLE.get(idx))
                        .collect();
                }
                true
            }
            _ => false,
        }
    }

    pub fn clear_custom(&mut self) -> bool {
        match self {
            SelectionMode::Custom(subset) => {
                subset.clear();
                true
            }
            _ => false,
        }
    }

    pub fn is_custom_selected(&self, kana: &Kana) -> bool {
        matches!(self, SelectionMode::Custom(subset) if subset.iter().any(|k| k.key() == kana.key()))
    }

    pub fn is_row_selected(&self, row: Row) -> bool {
        matches!(self, SelectionMode::Row(rows) if rows.contains(&row))
    }

    pub fn is_column_selected(&self, column: Column) -> bool {
        matches!(self, SelectionMode::Column(columns) if columns.contains(&column))
    }
}
