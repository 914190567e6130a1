use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueHint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MONTHS: [&str; 12] = [
    "CJAN", "CFEB", "CMAR", "CAPR", "CMAY", "CJUN", "CJUL", "CAUG", "CSEP", "COCT", "CNOV",
    "CDEC",
];

/// Write four synthetic NREL CSR style tables for trying out the viewer.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output directory
    #[arg(short, long, default_value = "sample_data", value_hint = ValueHint::DirPath)]
    out: PathBuf,

    /// Number of grid cells
    #[arg(short, long, default_value_t = 500)]
    cells: u32,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Seasonal profile of one component: mean level, swing and noise.
struct Profile {
    name: &'static str,
    level: f64,
    amplitude: f64,
    noise: f64,
    /// Every n-th cell is left out of this table (0 keeps all).
    skip_every: u32,
}

const PROFILES: [Profile; 4] = [
    Profile { name: "dni", level: 6000.0, amplitude: 1500.0, noise: 250.0, skip_every: 0 },
    Profile { name: "glo", level: 5500.0, amplitude: 1200.0, noise: 200.0, skip_every: 7 },
    Profile { name: "tilt", level: 5800.0, amplitude: 800.0, noise: 150.0, skip_every: 0 },
    Profile { name: "dif", level: 1800.0, amplitude: 400.0, noise: 100.0, skip_every: 11 },
];

struct Cell {
    id: i64,
    lat: f64,
    lon: f64,
}

fn write_table(dir: &Path, profile: &Profile, cells: &[Cell], rng: &mut StdRng) -> Result<usize> {
    let path = dir.join(format!("csr_africa_{}.csv", profile.name));
    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["PSECELLID"];
    header.extend(MONTHS);
    header.extend(["CANN", "LAT", "LON"]);
    writer.write_record(&header)?;

    let mut written = 0;
    for cell in cells {
        if profile.skip_every > 0 && cell.id % profile.skip_every as i64 == 0 {
            continue;
        }
        // Southern hemisphere cells peak in January, northern in July.
        let phase = if cell.lat < 0.0 { 0.0 } else { PI };
        let monthly: Vec<f64> = (0..12)
            .map(|m| {
                let season = (2.0 * PI * m as f64 / 12.0 + phase).cos();
                let value = profile.level + profile.amplitude * season
                    + rng.random_range(-profile.noise..profile.noise);
                value.max(0.0).round()
            })
            .collect();
        let annual = (monthly.iter().sum::<f64>() / 12.0).round();

        let mut record = vec![cell.id.to_string()];
        record.extend(monthly.iter().map(|v| v.to_string()));
        record.push(annual.to_string());
        record.push(format!("{:.3}", cell.lat));
        record.push(format!("{:.3}", cell.lon));
        writer.write_record(&record)?;
        written += 1;
    }
    writer.flush()?;
    println!("Wrote {written} rows to {}", path.display());
    Ok(written)
}

fn main() -> Result<()> {
    let args = Args::parse();
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let cells: Vec<Cell> = (1..=args.cells as i64)
        .map(|i| Cell {
            id: 1000 + i,
            lat: rng.random_range(-35.0..37.0),
            lon: rng.random_range(-17.0..51.0),
        })
        .collect();

    for profile in &PROFILES {
        write_table(&args.out, profile, &cells, &mut rng)?;
    }
    Ok(())
}
