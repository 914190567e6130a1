use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Column schema
// ---------------------------------------------------------------------------

/// Key column shared by all four source tables.
pub const ID_COLUMN: &str = "PSECELLID";
/// Annual coefficient column.
pub const ANNUAL_COLUMN: &str = "CANN";
pub const LAT_COLUMN: &str = "LAT";
pub const LON_COLUMN: &str = "LON";

pub const MONTH_COUNT: usize = 12;

/// Monthly coefficient columns, January first.
pub const MONTH_COLUMNS: [&str; MONTH_COUNT] = [
    "CJAN", "CFEB", "CMAR", "CAPR", "CMAY", "CJUN", "CJUL", "CAUG", "CSEP", "COCT", "CNOV",
    "CDEC",
];

/// Axis labels matching [`MONTH_COLUMNS`].
pub const MONTH_LABELS: [&str; MONTH_COUNT] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Every column a source table must carry.
pub fn required_columns() -> Vec<&'static str> {
    let mut cols = vec![ID_COLUMN];
    cols.extend(MONTH_COLUMNS);
    cols.extend([ANNUAL_COLUMN, LAT_COLUMN, LON_COLUMN]);
    cols
}

// ---------------------------------------------------------------------------
// IrradianceKind – one per source table
// ---------------------------------------------------------------------------

/// The four measured irradiance components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IrradianceKind {
    Direct,
    Global,
    Tilted,
    Diffuse,
}

/// Static naming for one source table inside the joined schema.
struct SourceSchema {
    short_name: &'static str,
    /// Appended to every column of this source in the joined table.
    /// Empty for the canonical (tilted) source.
    suffix: &'static str,
    label: &'static str,
}

/// Indexed by [`IrradianceKind::index`].
const SCHEMA: [SourceSchema; 4] = [
    SourceSchema { short_name: "DNI", suffix: "_dni", label: "Direct" },
    SourceSchema { short_name: "GLO", suffix: "_glo", label: "Global" },
    SourceSchema { short_name: "TILT", suffix: "", label: "Tilt" },
    SourceSchema { short_name: "DIF", suffix: "_dif", label: "Diffuse" },
];

impl IrradianceKind {
    /// Join order, which is also legend order.
    pub const ALL: [IrradianceKind; 4] = [
        IrradianceKind::Direct,
        IrradianceKind::Global,
        IrradianceKind::Tilted,
        IrradianceKind::Diffuse,
    ];

    pub fn index(self) -> usize {
        match self {
            IrradianceKind::Direct => 0,
            IrradianceKind::Global => 1,
            IrradianceKind::Tilted => 2,
            IrradianceKind::Diffuse => 3,
        }
    }

    /// "DNI", "GLO", "TILT" or "DIF".
    pub fn short_name(self) -> &'static str {
        SCHEMA[self.index()].short_name
    }

    pub fn suffix(self) -> &'static str {
        SCHEMA[self.index()].suffix
    }

    /// Legend label.
    pub fn label(self) -> &'static str {
        SCHEMA[self.index()].label
    }

    /// Qualified name of `base` in the joined table, e.g. `CJAN_dni`.
    pub fn column_name(self, base: &str) -> String {
        format!("{base}{}", self.suffix())
    }
}

impl fmt::Display for IrradianceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

// ---------------------------------------------------------------------------
// Source tables
// ---------------------------------------------------------------------------

/// One row of a source CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    pub cell_id: i64,
    pub monthly: [f64; MONTH_COUNT],
    pub annual: f64,
    pub lat: f64,
    pub lon: f64,
}

/// A whole source CSV, rows kept in file order.
#[derive(Debug, Clone)]
pub struct MeasurementTable {
    pub kind: IrradianceKind,
    pub records: Vec<MeasurementRecord>,
}

impl MeasurementTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The four loaded tables, indexed by kind.
#[derive(Debug, Clone)]
pub struct SourceTables {
    tables: [MeasurementTable; 4],
}

impl SourceTables {
    pub fn new(
        direct: MeasurementTable,
        global: MeasurementTable,
        tilted: MeasurementTable,
        diffuse: MeasurementTable,
    ) -> Self {
        SourceTables {
            tables: [direct, global, tilted, diffuse],
        }
    }

    pub fn get(&self, kind: IrradianceKind) -> &MeasurementTable {
        &self.tables[kind.index()]
    }
}

// ---------------------------------------------------------------------------
// JoinedRow / JoinedTable
// ---------------------------------------------------------------------------

/// One cell present in all four sources.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub cell_id: i64,
    /// Indexed by [`IrradianceKind::index`].
    sources: [MeasurementRecord; 4],
}

impl JoinedRow {
    pub fn new(cell_id: i64, sources: [MeasurementRecord; 4]) -> Self {
        JoinedRow { cell_id, sources }
    }

    pub fn source(&self, kind: IrradianceKind) -> &MeasurementRecord {
        &self.sources[kind.index()]
    }

    pub fn monthly(&self, kind: IrradianceKind) -> &[f64; MONTH_COUNT] {
        &self.source(kind).monthly
    }

    /// Canonical latitude (tilted source).
    pub fn lat(&self) -> f64 {
        self.source(IrradianceKind::Tilted).lat
    }

    /// Canonical longitude (tilted source).
    pub fn lon(&self) -> f64 {
        self.source(IrradianceKind::Tilted).lon
    }

    /// Whether every source reports the canonical coordinates.
    pub fn coordinates_agree(&self) -> bool {
        let (lat, lon) = (self.lat(), self.lon());
        self.sources.iter().all(|s| s.lat == lat && s.lon == lon)
    }
}

/// Result of joining the four sources on [`ID_COLUMN`].
#[derive(Debug, Clone, Default)]
pub struct JoinedTable {
    rows: Vec<JoinedRow>,
    /// cell_id → position of its first row.
    index: HashMap<i64, usize>,
}

impl JoinedTable {
    pub fn from_rows(rows: Vec<JoinedRow>) -> Self {
        let mut index = HashMap::with_capacity(rows.len());
        for (pos, row) in rows.iter().enumerate() {
            index.entry(row.cell_id).or_insert(pos);
        }
        JoinedTable { rows, index }
    }

    pub fn rows(&self) -> &[JoinedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row carrying `cell_id`.
    pub fn find(&self, cell_id: i64) -> Option<&JoinedRow> {
        self.index.get(&cell_id).map(|&pos| &self.rows[pos])
    }

    /// All qualified column names, in the order the sources were joined.
    pub fn column_names() -> Vec<String> {
        let mut names = vec![ID_COLUMN.to_string()];
        for kind in IrradianceKind::ALL {
            for base in MONTH_COLUMNS
                .iter()
                .chain([ANNUAL_COLUMN, LAT_COLUMN, LON_COLUMN].iter())
            {
                names.push(kind.column_name(base));
            }
        }
        names
    }
}
