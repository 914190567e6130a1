use crate::config::Config;
use crate::data::join::join_tables;
use crate::data::loader::load_all;
use crate::data::lookup::{lookup_input, CellSeries, LookupOutcome};
use crate::data::model::{IrradianceKind, JoinedTable};
use crate::error::Result;
use crate::regression::{fit, FitConfig, FitReport};

// ---------------------------------------------------------------------------
// Startup data
// ---------------------------------------------------------------------------

/// Joined table and fitted model, built once before the window opens.
#[derive(Debug, Clone)]
pub struct AppData {
    pub joined: JoinedTable,
    pub fit: FitReport,
}

impl AppData {
    /// Load, join and fit. Any error here is fatal.
    pub fn load(config: &Config) -> Result<Self> {
        let sources = load_all(&config.paths)?;
        let joined = join_tables(&sources);
        Self::from_joined(joined, &config.fit)
    }

    pub fn from_joined(joined: JoinedTable, fit_config: &FitConfig) -> Result<Self> {
        let fit = fit(&joined, fit_config)?;
        Ok(AppData { joined, fit })
    }
}

// ---------------------------------------------------------------------------
// Series visibility
// ---------------------------------------------------------------------------

/// One on/off flag per irradiance kind. All series start visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesVisibility([bool; 4]);

impl Default for SeriesVisibility {
    fn default() -> Self {
        SeriesVisibility([true; 4])
    }
}

impl SeriesVisibility {
    pub fn is_visible(&self, kind: IrradianceKind) -> bool {
        self.0[kind.index()]
    }

    pub fn toggle(&mut self, kind: IrradianceKind) {
        self.0[kind.index()] = !self.0[kind.index()];
    }

    /// Visible kinds in legend order.
    pub fn visible(&self) -> Vec<IrradianceKind> {
        IrradianceKind::ALL
            .into_iter()
            .filter(|&k| self.is_visible(k))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Chart state
// ---------------------------------------------------------------------------

/// What the central panel shows. Replaced wholesale on every lookup.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ChartState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// The last lookup matched no joined row.
    NoData { cell_id: i64 },
    Series(CellSeries),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub data: AppData,

    /// Text of the cell identifier box.
    pub input: String,

    pub visibility: SeriesVisibility,

    pub chart: ChartState,

    /// Set when `chart` is replaced; the plot resets its bounds and clears it.
    pub chart_changed: bool,

    /// Notice shown in the status line (bad input and the like).
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(data: AppData) -> Self {
        Self {
            data,
            input: String::new(),
            visibility: SeriesVisibility::default(),
            chart: ChartState::Idle,
            chart_changed: false,
            status_message: None,
        }
    }

    /// Look up the identifier in the input box and replace the chart.
    /// On unparseable input the chart is left as it was.
    pub fn generate(&mut self) {
        match lookup_input(&self.data.joined, &self.input) {
            Ok(LookupOutcome::Found(series)) => {
                log::debug!("Plotting cell {}", series.cell_id);
                if !series.coordinates_agree {
                    self.status_message = Some(format!(
                        "Cell {}: sources disagree on coordinates, showing TILT values",
                        series.cell_id
                    ));
                } else {
                    self.status_message = None;
                }
                self.replace_chart(ChartState::Series(series));
            }
            Ok(LookupOutcome::Empty { cell_id }) => {
                self.replace_chart(ChartState::NoData { cell_id });
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("{e}");
                self.status_message = Some(e.to_string());
            }
        }
    }

    fn replace_chart(&mut self, chart: ChartState) {
        if self.chart != chart {
            self.chart = chart;
            self.chart_changed = true;
        }
    }

    /// Flip one series, then redraw from whatever identifier is in the input
    /// box, exactly as Generate would.
    pub fn toggle(&mut self, kind: IrradianceKind) {
        self.visibility.toggle(kind);
        log::debug!(
            "{kind} series {}",
            if self.visibility.is_visible(kind) { "shown" } else { "hidden" }
        );
        self.generate();
    }

    /// Fit quality line for the status bar.
    pub fn metrics_line(&self) -> String {
        format!(
            "Mean Squared Error: {:.2}, R-squared: {:.2}",
            self.data.fit.mse, self.data.fit.r2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataPaths;
    use crate::data::loader::tests::{csv_line, write_csv};
    use crate::data::model::tests::record;
    use crate::data::model::JoinedRow;
    use crate::error::Error;

    fn app() -> AppState {
        let rows = (0..6)
            .map(|i| {
                let id = 1000 + i;
                let base = 100.0 + 7.0 * i as f64;
                JoinedRow::new(
                    id,
                    [
                        record(id, base, 10.0, 10.0, 20.0),
                        record(id, base * 2.0, 5.0, 10.0, 20.0),
                        record(id, base * 1.5, 8.0, 10.0, 20.0),
                        record(id, base / 2.0, 2.0, 10.0, 20.0),
                    ],
                )
            })
            .collect();
        let data = AppData::from_joined(JoinedTable::from_rows(rows), &FitConfig::default())
            .unwrap();
        AppState::new(data)
    }

    #[test]
    fn generate_plots_known_cell() {
        let mut state = app();
        state.input = " 1001 ".into();
        state.generate();
        match &state.chart {
            ChartState::Series(s) => {
                assert_eq!(s.cell_id, 1001);
                assert_eq!(s.series(IrradianceKind::Direct)[0], 107.0);
                assert_eq!((s.lat, s.lon), (10.0, 20.0));
            }
            other => panic!("unexpected chart {other:?}"),
        }
        assert!(state.status_message.is_none());
    }

    #[test]
    fn unknown_cell_shows_placeholder() {
        let mut state = app();
        state.input = "9999".into();
        state.generate();
        assert_eq!(state.chart, ChartState::NoData { cell_id: 9999 });
    }

    #[test]
    fn bad_input_keeps_previous_chart() {
        let mut state = app();
        state.input = "1002".into();
        state.generate();
        let before = state.chart.clone();
        let visibility = state.visibility;

        state.input = "abc".into();
        state.generate();
        assert_eq!(state.chart, before);
        assert_eq!(state.visibility, visibility);
        assert!(state.status_message.as_deref().unwrap_or("").contains("abc"));
    }

    #[test]
    fn toggling_twice_restores_visible_series() {
        let mut state = app();
        let original = state.visibility.visible();
        assert_eq!(original.len(), 4);

        state.toggle(IrradianceKind::Global);
        assert_eq!(
            state.visibility.visible(),
            vec![IrradianceKind::Direct, IrradianceKind::Tilted, IrradianceKind::Diffuse]
        );
        state.toggle(IrradianceKind::Global);
        assert_eq!(state.visibility.visible(), original);
    }

    #[test]
    fn toggle_with_unchanged_input_keeps_cell() {
        let mut state = app();
        state.input = "1003".into();
        state.generate();
        let before = state.chart.clone();
        state.chart_changed = false;

        state.toggle(IrradianceKind::Tilted);
        assert_eq!(state.chart, before);
        assert!(!state.chart_changed);
        assert!(!state.visibility.is_visible(IrradianceKind::Tilted));
    }

    #[test]
    fn toggle_redraws_from_edited_input() {
        let mut state = app();
        state.input = "1001".into();
        state.generate();

        state.input = "1002".into();
        state.toggle(IrradianceKind::Global);
        let ChartState::Series(cell) = &state.chart else {
            panic!("expected series, got {:?}", state.chart);
        };
        assert_eq!(cell.cell_id, 1002);
        assert!(!state.visibility.is_visible(IrradianceKind::Global));

        state.input = "4242".into();
        state.toggle(IrradianceKind::Global);
        assert_eq!(state.chart, ChartState::NoData { cell_id: 4242 });
        assert!(state.visibility.is_visible(IrradianceKind::Global));
    }

    #[test]
    fn toggle_with_bad_input_keeps_chart_and_flips_flag() {
        let mut state = app();
        state.input = "1004".into();
        state.generate();
        let before = state.chart.clone();

        state.input = "x1".into();
        state.toggle(IrradianceKind::Diffuse);
        assert_eq!(state.chart, before);
        assert!(!state.visibility.is_visible(IrradianceKind::Diffuse));
        assert!(state.status_message.as_deref().unwrap_or("").contains("x1"));
    }

    #[test]
    fn new_chart_requests_plot_reset() {
        let mut state = app();
        assert!(!state.chart_changed);

        state.input = "1000".into();
        state.generate();
        assert!(state.chart_changed);

        state.chart_changed = false;
        state.generate();
        assert!(!state.chart_changed);

        state.input = "1005".into();
        state.generate();
        assert!(state.chart_changed);
    }

    #[test]
    fn metrics_line_has_two_decimals() {
        let state = app();
        let line = state.metrics_line();
        assert!(line.starts_with("Mean Squared Error: "));
        assert!(line.contains(", R-squared: "));
    }

    #[test]
    fn load_joins_and_fits_from_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        for kind in IrradianceKind::ALL {
            let base = 100.0 * (kind.index() + 1) as f64;
            let mut lines: Vec<String> = (1001..=1010)
                .filter(|&id| !(kind == IrradianceKind::Global && id == 1005))
                .map(|id| csv_line(id, base + (id - 1001) as f64, 10.0, 20.0))
                .collect();
            if kind == IrradianceKind::Tilted {
                lines.push(csv_line(2000, 1.0, 0.0, 0.0));
            }
            let name = crate::config::default_file_name(kind);
            write_csv(dir.path(), &name, &lines);
        }

        let config = Config {
            paths: DataPaths::in_dir(dir.path()),
            fit: FitConfig::default(),
        };
        let data = AppData::load(&config).unwrap();
        assert_eq!(data.joined.len(), 9);
        assert!(data.joined.find(1005).is_none());
        assert!(data.joined.find(2000).is_none());
        assert_eq!(data.fit.train_rows + data.fit.test_rows, 9);

        let mut state = AppState::new(data);
        state.input = "1001".into();
        state.generate();
        let ChartState::Series(cell) = &state.chart else {
            panic!("expected series, got {:?}", state.chart);
        };
        assert_eq!(
            cell.series(IrradianceKind::Direct),
            &[100.0, 110.0, 120.0, 130.0, 140.0, 150.0, 160.0, 170.0, 180.0, 190.0, 200.0, 210.0]
        );
        assert_eq!(cell.series(IrradianceKind::Diffuse)[0], 400.0);
        assert_eq!((cell.lat, cell.lon), (10.0, 20.0));
        assert!((cell.predicted_annual(&state.data.fit.model) - cell.annual).abs() < 1e-6);
    }

    #[test]
    fn load_fails_on_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            paths: DataPaths::in_dir(dir.path()),
            fit: FitConfig::default(),
        };
        assert!(matches!(AppData::load(&config), Err(Error::FileAccess { .. })));
    }
}
