use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::model::{IrradianceKind, JoinedRow, JoinedTable, ANNUAL_COLUMN, MONTH_COUNT};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Source of the features (its monthly coefficients) and of the target (its
/// annual coefficient). Its columns are the unsuffixed ones in the joined table.
pub const MODEL_SOURCE: IrradianceKind = IrradianceKind::Tilted;
/// Target column name, for logging.
pub const TARGET_COLUMN: &str = ANNUAL_COLUMN;

/// SVD sweeps allowed before the solve is abandoned.
const SVD_MAX_ITERATIONS: usize = 10_000;

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    /// Share of rows held out for evaluation, in (0, 1).
    pub test_fraction: f64,
    /// Seed of the partition shuffle.
    pub seed: u64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
        }
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Linear map from twelve monthly coefficients to an annual figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedModel {
    pub weights: [f64; MONTH_COUNT],
    pub intercept: f64,
}

impl FittedModel {
    pub fn predict(&self, features: &[f64; MONTH_COUNT]) -> f64 {
        self.intercept
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

/// Model plus its holdout metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    pub model: FittedModel,
    pub mse: f64,
    pub r2: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

// ---------------------------------------------------------------------------
// Train / test partition
// ---------------------------------------------------------------------------

/// Row indices of each partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a seeded RNG; the first `ceil(test_fraction * n)`
/// indices form the holdout and the rest the training set.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<Split> {
    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(Error::InsufficientData { rows: n });
    }

    let mut perm: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    perm.shuffle(&mut rng);

    let train = perm.split_off(n_test);
    Ok(Split { train, test: perm })
}

// ---------------------------------------------------------------------------
// Fitting
// ---------------------------------------------------------------------------

fn features(row: &JoinedRow) -> [f64; MONTH_COUNT] {
    *row.monthly(MODEL_SOURCE)
}

fn target(row: &JoinedRow) -> f64 {
    row.source(MODEL_SOURCE).annual
}

/// Ordinary least squares with intercept.
///
/// Features and target are centred on their means, the centred system is
/// solved by SVD (minimum-norm solution when the features are collinear) and
/// the intercept recovered from the means.
pub fn ordinary_least_squares(
    x: &[[f64; MONTH_COUNT]],
    y: &[f64],
) -> Result<FittedModel> {
    let n = x.len();
    if n == 0 || n != y.len() {
        return Err(Error::InsufficientData { rows: n.min(y.len()) });
    }
    if x.iter().flatten().chain(y).any(|v| !v.is_finite()) {
        return Err(Error::Solve("non-finite value in regression input".into()));
    }

    let design = DMatrix::from_fn(n, MONTH_COUNT, |i, j| x[i][j]);
    let target = DVector::from_column_slice(y);

    let x_mean: Vec<f64> = design.column_iter().map(|c| c.mean()).collect();
    let y_mean = target.mean();

    let mut centred = design;
    for (mut col, mean) in centred.column_iter_mut().zip(&x_mean) {
        col.add_scalar_mut(-mean);
    }
    let target = target.add_scalar(-y_mean);

    let svd = centred
        .try_svd(true, true, f64::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or_else(|| Error::Solve("SVD did not converge".into()))?;
    let tol = svd.singular_values.max() * (n.max(MONTH_COUNT) as f64) * f64::EPSILON;
    let solution = svd
        .solve(&target, tol)
        .map_err(|e| Error::Solve(e.to_string()))?;

    let mut weights = [0.0; MONTH_COUNT];
    for (w, s) in weights.iter_mut().zip(solution.iter()) {
        *w = *s;
    }
    let intercept = y_mean
        - weights
            .iter()
            .zip(&x_mean)
            .map(|(w, m)| w * m)
            .sum::<f64>();

    Ok(FittedModel { weights, intercept })
}

/// Fit the annual-from-monthly model on the joined table and score it on the
/// holdout partition.
pub fn fit(table: &JoinedTable, config: &FitConfig) -> Result<FitReport> {
    if table.is_empty() {
        return Err(Error::NoCommonCells);
    }
    let split = train_test_split(table.len(), config.test_fraction, config.seed)?;
    let rows = table.rows();

    let gather = |indices: &[usize]| -> (Vec<[f64; MONTH_COUNT]>, Vec<f64>) {
        indices
            .iter()
            .map(|&i| (features(&rows[i]), target(&rows[i])))
            .unzip()
    };

    let (x_train, y_train) = gather(&split.train);
    let (x_test, y_test) = gather(&split.test);

    let model = ordinary_least_squares(&x_train, &y_train)?;
    let y_pred: Vec<f64> = x_test.iter().map(|x| model.predict(x)).collect();

    let report = FitReport {
        model,
        mse: mean_squared_error(&y_test, &y_pred),
        r2: r2_score(&y_test, &y_pred),
        train_rows: split.train.len(),
        test_rows: split.test.len(),
    };
    log::info!(
        "Fitted {TARGET_COLUMN} model on {} rows (holdout {}): MSE {:.4}, R² {:.4}",
        report.train_rows,
        report.test_rows,
        report.mse,
        report.r2
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return f64::NAN;
    }
    y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64
}

/// Coefficient of determination. A constant target scores 1.0 when predicted
/// exactly and 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return f64::NAN;
    }
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::data::model::tests::record;

    const TRUE_WEIGHTS: [f64; MONTH_COUNT] =
        [0.5, 1.0, -0.25, 2.0, 0.1, 0.0, 0.75, -1.5, 0.3, 1.2, 0.05, 0.9];
    const TRUE_INTERCEPT: f64 = 12.5;

    /// Joined table whose tilted annual value is an exact linear function of
    /// the tilted months.
    fn linear_table(n: usize) -> JoinedTable {
        let mut rng = StdRng::seed_from_u64(7);
        let rows = (0..n as i64)
            .map(|id| {
                let mut tilted = record(id, 0.0, 0.0, 0.0, 0.0);
                for v in tilted.monthly.iter_mut() {
                    *v = rng.random_range(1000.0..8000.0);
                }
                tilted.annual = FittedModel {
                    weights: TRUE_WEIGHTS,
                    intercept: TRUE_INTERCEPT,
                }
                .predict(&tilted.monthly);
                let other = record(id, 1.0, 1.0, 0.0, 0.0);
                let mut sources = [other.clone(), other.clone(), other.clone(), other];
                sources[IrradianceKind::Tilted.index()] = tilted;
                JoinedRow::new(id, sources)
            })
            .collect();
        JoinedTable::from_rows(rows)
    }

    #[test]
    fn split_sizes_follow_test_fraction() {
        let split = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        let split = train_test_split(11, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 3);
        assert_eq!(split.train.len(), 8);
    }

    #[test]
    fn split_partitions_every_row_once() {
        let split = train_test_split(50, 0.2, 1).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_reproducible_for_a_seed() {
        assert_eq!(
            train_test_split(100, 0.2, 42).unwrap(),
            train_test_split(100, 0.2, 42).unwrap()
        );
    }

    #[test]
    fn too_few_rows_cannot_be_split() {
        assert!(matches!(
            train_test_split(1, 0.2, 42),
            Err(Error::InsufficientData { rows: 1 })
        ));
        assert!(matches!(
            train_test_split(0, 0.2, 42),
            Err(Error::InsufficientData { rows: 0 })
        ));
        assert!(train_test_split(2, 0.2, 42).is_ok());
    }

    #[test]
    fn recovers_exact_linear_relation() {
        let report = fit(&linear_table(60), &FitConfig::default()).unwrap();
        for (got, want) in report.model.weights.iter().zip(TRUE_WEIGHTS) {
            assert!((got - want).abs() < 1e-6, "weight {got} != {want}");
        }
        assert!((report.model.intercept - TRUE_INTERCEPT).abs() < 1e-4);
        assert!(report.mse < 1e-8);
        assert!((report.r2 - 1.0).abs() < 1e-9);
        assert_eq!(report.train_rows + report.test_rows, 60);
    }

    #[test]
    fn refitting_is_deterministic() {
        let table = linear_table(40);
        let config = FitConfig {
            test_fraction: 0.25,
            seed: 99,
        };
        assert_eq!(fit(&table, &config).unwrap(), fit(&table, &config).unwrap());
    }

    #[test]
    fn collinear_features_still_fit() {
        let x: Vec<[f64; MONTH_COUNT]> = (0..8).map(|i| [i as f64; MONTH_COUNT]).collect();
        let y: Vec<f64> = (0..8).map(|i| 3.0 + 12.0 * i as f64).collect();
        let model = ordinary_least_squares(&x, &y).unwrap();
        for (i, row) in x.iter().enumerate() {
            assert!((model.predict(row) - y[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn non_finite_input_is_a_solve_error() {
        let mut x: Vec<[f64; MONTH_COUNT]> = (0..10)
            .map(|i| {
                let mut row = [0.0; MONTH_COUNT];
                for (m, v) in row.iter_mut().enumerate() {
                    *v = (i * MONTH_COUNT + m) as f64;
                }
                row
            })
            .collect();
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        x[3][5] = f64::NAN;
        assert!(matches!(ordinary_least_squares(&x, &y), Err(Error::Solve(_))));

        x[3][5] = 1.0;
        let mut y = y;
        y[0] = f64::INFINITY;
        assert!(matches!(ordinary_least_squares(&x, &y), Err(Error::Solve(_))));
    }

    #[test]
    fn empty_joined_table_is_rejected_before_split() {
        assert!(matches!(
            fit(&JoinedTable::default(), &FitConfig::default()),
            Err(Error::NoCommonCells)
        ));
    }

    #[test]
    fn model_reads_tilted_source_only() {
        let table = linear_table(1);
        let row = &table.rows()[0];
        assert_eq!(&features(row), row.monthly(IrradianceKind::Tilted));
        assert_eq!(target(row), row.source(IrradianceKind::Tilted).annual);
        assert_ne!(target(row), row.source(IrradianceKind::Direct).annual);
    }

    #[test]
    fn metric_edge_cases() {
        assert_eq!(mean_squared_error(&[1.0, 3.0], &[2.0, 1.0]), 2.5);
        assert_eq!(r2_score(&[4.0, 4.0], &[4.0, 4.0]), 1.0);
        assert_eq!(r2_score(&[4.0, 4.0], &[3.0, 4.0]), 0.0);
        assert!((r2_score(&[1.0, 2.0, 3.0], &[1.0, 2.0, 4.0]) - 0.5).abs() < 1e-12);
        assert!(mean_squared_error(&[], &[]).is_nan());
    }
}
