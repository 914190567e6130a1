use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::DataPaths;
use crate::error::{Error, Result};

use super::model::{
    IrradianceKind, MeasurementRecord, MeasurementTable, SourceTables, ANNUAL_COLUMN, ID_COLUMN,
    LAT_COLUMN, LON_COLUMN, MONTH_COLUMNS, MONTH_COUNT, required_columns,
};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load all four source tables. The first failure aborts the load.
pub fn load_all(paths: &DataPaths) -> Result<SourceTables> {
    let load = |kind| load_table(kind, paths.get(kind));
    Ok(SourceTables::new(
        load(IrradianceKind::Direct)?,
        load(IrradianceKind::Global)?,
        load(IrradianceKind::Tilted)?,
        load(IrradianceKind::Diffuse)?,
    ))
}

/// Load one source CSV.
///
/// The header must name [`ID_COLUMN`], every month column, [`ANNUAL_COLUMN`],
/// [`LAT_COLUMN`] and [`LON_COLUMN`]; any further columns are ignored.
pub fn load_table(kind: IrradianceKind, path: &Path) -> Result<MeasurementTable> {
    let file = File::open(path).map_err(|source| Error::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_table(kind, file, path)?;
    if table.is_empty() {
        log::warn!("{} table {} has no data rows", kind, path.display());
    }
    log::info!(
        "Loaded {} {} rows from {}",
        table.len(),
        kind,
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Field positions of the required columns in one CSV header.
struct ColumnLayout {
    id: usize,
    months: [usize; MONTH_COUNT],
    annual: usize,
    lat: usize,
    lon: usize,
}

impl ColumnLayout {
    fn from_headers(headers: &csv::StringRecord, path: &Path) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<&str> = required_columns()
            .into_iter()
            .filter(|col| position(col).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(parse_error(
                path,
                format!("missing column(s): {}", missing.join(", ")),
            ));
        }

        let required = |name: &str| {
            position(name).ok_or_else(|| parse_error(path, format!("missing column {name}")))
        };
        let mut months = [0usize; MONTH_COUNT];
        for (slot, name) in months.iter_mut().zip(MONTH_COLUMNS) {
            *slot = required(name)?;
        }

        Ok(ColumnLayout {
            id: required(ID_COLUMN)?,
            months,
            annual: required(ANNUAL_COLUMN)?,
            lat: required(LAT_COLUMN)?,
            lon: required(LON_COLUMN)?,
        })
    }
}

/// Parse CSV text from any reader. `path` is only used in error messages.
pub(crate) fn read_table<R: Read>(
    kind: IrradianceKind,
    source: R,
    path: &Path,
) -> Result<MeasurementTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| parse_error(path, format!("reading header: {e}")))?
        .clone();
    let layout = ColumnLayout::from_headers(&headers, path)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = row_no + 2;
        let record = result.map_err(|e| parse_error(path, format!("line {line}: {e}")))?;

        let field = |idx: usize| record.get(idx).unwrap_or("");
        let number = |idx: usize, col: &str| -> Result<f64> {
            let raw = field(idx);
            let value = raw.parse::<f64>().map_err(|_| {
                parse_error(path, format!("line {line}, {col}: '{raw}' is not a number"))
            })?;
            // `parse` accepts NaN and inf; neither is a measurement.
            if !value.is_finite() {
                return Err(parse_error(
                    path,
                    format!("line {line}, {col}: '{raw}' is not a finite number"),
                ));
            }
            Ok(value)
        };

        let raw_id = field(layout.id);
        let cell_id = raw_id.parse::<i64>().map_err(|_| {
            parse_error(
                path,
                format!("line {line}, {ID_COLUMN}: '{raw_id}' is not an integer"),
            )
        })?;

        let mut monthly = [0.0; MONTH_COUNT];
        for ((value, &idx), col) in monthly.iter_mut().zip(&layout.months).zip(MONTH_COLUMNS) {
            *value = number(idx, col)?;
        }

        records.push(MeasurementRecord {
            cell_id,
            monthly,
            annual: number(layout.annual, ANNUAL_COLUMN)?,
            lat: number(layout.lat, LAT_COLUMN)?,
            lon: number(layout.lon, LON_COLUMN)?,
        });
    }

    Ok(MeasurementTable { kind, records })
}

fn parse_error(path: &Path, message: String) -> Error {
    Error::Parse {
        path: PathBuf::from(path),
        message,
    }
}
