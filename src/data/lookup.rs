use crate::error::{Error, Result};
use crate::regression::FittedModel;

use super::model::{IrradianceKind, JoinedTable, MONTH_COUNT};

// ---------------------------------------------------------------------------
// Input parsing
// ---------------------------------------------------------------------------

/// Parse the free-text identifier typed by the user.
pub fn parse_cell_id(input: &str) -> Result<i64> {
    input.trim().parse::<i64>().map_err(|_| Error::InputFormat {
        input: input.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Series extraction
// ---------------------------------------------------------------------------

/// Everything the chart needs for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSeries {
    pub cell_id: i64,
    /// Monthly values per kind, indexed by [`IrradianceKind::index`].
    series: [[f64; MONTH_COUNT]; 4],
    pub lat: f64,
    pub lon: f64,
    /// Observed tilted annual coefficient.
    pub annual: f64,
    /// False when some source reported other coordinates than the tilted one.
    pub coordinates_agree: bool,
}

impl CellSeries {
    /// Twelve values for `kind`, January first.
    pub fn series(&self, kind: IrradianceKind) -> &[f64; MONTH_COUNT] {
        &self.series[kind.index()]
    }

    /// Annual value predicted from the tilted monthly series.
    pub fn predicted_annual(&self, model: &FittedModel) -> f64 {
        model.predict(self.series(IrradianceKind::Tilted))
    }
}

/// Outcome of looking up a cell identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(CellSeries),
    /// No joined row carries this identifier.
    Empty { cell_id: i64 },
}

/// Extract the four monthly series and coordinates for `cell_id`.
/// When duplicates exist the first joined row is used.
pub fn lookup(table: &JoinedTable, cell_id: i64) -> LookupOutcome {
    let Some(row) = table.find(cell_id) else {
        log::debug!("lookup {cell_id}: no joined row");
        return LookupOutcome::Empty { cell_id };
    };

    let series = IrradianceKind::ALL.map(|kind| *row.monthly(kind));
    LookupOutcome::Found(CellSeries {
        cell_id,
        series,
        lat: row.lat(),
        lon: row.lon(),
        annual: row.source(IrradianceKind::Tilted).annual,
        coordinates_agree: row.coordinates_agree(),
    })
}

/// Parse `input` and look it up in one step.
pub fn lookup_input(table: &JoinedTable, input: &str) -> Result<LookupOutcome> {
    parse_cell_id(input).map(|id| lookup(table, id))
}
