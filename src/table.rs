use crate::aggregate::{MatchStatRow, Outcome};
use crate::error::TableShapeError;
use polars::prelude::*;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Float,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(value) => write!(f, "{}", value),
            Cell::Float(value) => write!(f, "{}", value),
            Cell::Text(value) => f.write_str(value),
        }
    }
}

pub const MATCH_ID: &str = "Match ID";
pub const RESULT: &str = "Result";
pub const KDA: &str = "KDA";

/// Output columns, in order. `Match ID` is the dense row index.
pub const SCHEMA: [(&str, ColumnKind); 18] = [
    (MATCH_ID, ColumnKind::Int),
    ("Date Played", ColumnKind::Text),
    ("Game Time", ColumnKind::Text),
    ("Game Mode", ColumnKind::Text),
    (RESULT, ColumnKind::Text),
    ("Kills", ColumnKind::Int),
    ("Deaths", ColumnKind::Int),
    ("Assists", ColumnKind::Int),
    (KDA, ColumnKind::Float),
    ("Gold Earned", ColumnKind::Int),
    ("CS (Minions Killed)", ColumnKind::Int),
    ("Damage Dealt to Champions", ColumnKind::Int),
    ("Vision Score", ColumnKind::Int),
    ("Wards Placed", ColumnKind::Int),
    ("Wards Killed", ColumnKind::Int),
    ("Vision Wards Bought", ColumnKind::Int),
    ("Vision Score / Min", ColumnKind::Float),
    ("Summoner Icon", ColumnKind::Int),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub values: Vec<Option<Cell>>,
}

/// Mutable side of the table. Only the pipeline appends to it; `finish`
/// aligns the columns and hands out the read-only table.
#[derive(Debug)]
pub struct TableBuilder {
    columns: Vec<Column>,
    rows: usize,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            columns: SCHEMA
                .iter()
                .map(|(name, kind)| Column {
                    name: *name,
                    kind: *kind,
                    values: Vec::new(),
                })
                .collect(),
            rows: 0,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn push_row(&mut self, row: &MatchStatRow) {
        let cells = [
            Some(Cell::Int(row.index as i64)),
            Some(Cell::Text(row.date_played.clone())),
            Some(Cell::Text(row.game_time.clone())),
            Some(Cell::Text(row.game_mode.clone())),
            Some(Cell::Text(row.result.as_str().to_string())),
            Some(Cell::Int(row.kills.into())),
            Some(Cell::Int(row.deaths.into())),
            Some(Cell::Int(row.assists.into())),
            Some(Cell::Float(row.kda)),
            Some(Cell::Int(row.gold_earned.into())),
            Some(Cell::Int(row.minions_killed.into())),
            Some(Cell::Int(row.damage_to_champions.into())),
            Some(Cell::Int(row.vision_score.into())),
            Some(Cell::Int(row.wards_placed.into())),
            Some(Cell::Int(row.wards_killed.into())),
            Some(Cell::Int(row.vision_wards_bought.into())),
            row.vision_score_per_min.map(Cell::Float),
            row.summoner_icon.map(|icon| Cell::Int(icon.into())),
        ];
        for (column, cell) in SCHEMA.iter().zip(cells) {
            self.push_cell(column.0, cell);
        }
        self.rows += 1;
    }

    fn push_cell(&mut self, name: &str, cell: Option<Cell>) {
        if let Some(column) = self.columns.iter_mut().find(|c| c.name == name) {
            column.values.push(cell);
        }
    }

    /// Pads every short column with nulls up to the row count. A column
    /// longer than the row count means rows were appended out of step and is
    /// reported instead of being truncated.
    pub fn finish(mut self) -> Result<MatchStatTable, TableShapeError> {
        let rows = self.rows;
        for column in &mut self.columns {
            if column.values.len() > rows {
                return Err(TableShapeError {
                    column: column.name,
                    len: column.values.len(),
                    rows,
                });
            }
            column.values.resize(rows, None);
        }
        Ok(MatchStatTable {
            columns: self.columns,
            rows,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchStatTable {
    columns: Vec<Column>,
    rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub matches: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: Option<f64>,
    pub average_kda: Option<f64>,
}

impl MatchStatTable {
    pub fn empty() -> Self {
        Self {
            columns: TableBuilder::new().columns,
            rows: 0,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        self.column(column)?.values.get(row)?.as_ref()
    }

    pub fn summary(&self) -> TableSummary {
        let wins = self
            .column(RESULT)
            .map(|c| {
                c.values
                    .iter()
                    .filter(|v| matches!(v, Some(Cell::Text(r)) if r == Outcome::Win.as_str()))
                    .count()
            })
            .unwrap_or(0);
        let kdas: Vec<f64> = self
            .column(KDA)
            .map(|c| {
                c.values
                    .iter()
                    .filter_map(|v| match v {
                        Some(Cell::Float(kda)) => Some(*kda),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        TableSummary {
            matches: self.rows,
            wins,
            losses: self.rows - wins,
            win_rate: (self.rows > 0).then(|| wins as f64 / self.rows as f64),
            average_kda: (!kdas.is_empty()).then(|| kdas.iter().sum::<f64>() / kdas.len() as f64),
        }
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let series = self
            .columns
            .iter()
            .map(|column| match column.kind {
                ColumnKind::Int => {
                    let values: Vec<Option<i64>> = column
                        .values
                        .iter()
                        .map(|v| match v {
                            Some(Cell::Int(n)) => Some(*n),
                            _ => None,
                        })
                        .collect();
                    Series::new(column.name, values)
                }
                ColumnKind::Float => {
                    let values: Vec<Option<f64>> = column
                        .values
                        .iter()
                        .map(|v| match v {
                            Some(Cell::Float(n)) => Some(*n),
                            _ => None,
                        })
                        .collect();
                    Series::new(column.name, values)
                }
                ColumnKind::Text => {
                    let values: Vec<Option<String>> = column
                        .values
                        .iter()
                        .map(|v| v.as_ref().map(|cell| cell.to_string()))
                        .collect();
                    Series::new(column.name, values)
                }
            })
            .collect::<Vec<_>>();

        DataFrame::new(series)
    }
}
