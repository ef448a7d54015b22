use std::path::PathBuf;
use std::time::Duration;

use blockfield_heightmap::HeightRaster;
use blockfield_render::{DebugTextRenderer, Renderer};
use blockfield_session::{Session, SessionConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Darkest to brightest.
const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

/// Simulated clock resolution for `simulate`.
const SIM_STEP_MS: u64 = 10;

#[derive(Parser)]
#[command(name = "blockfield-cli", about = "Headless block field tools")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON session config; subcommand flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run a session on a simulated clock and report every publish
    Simulate {
        /// Simulated run length in milliseconds
        #[arg(short, long, default_value = "2000")]
        duration_ms: u64,
        /// RNG seed
        #[arg(short, long)]
        seed: Option<u64>,
        /// Milliseconds between regenerations
        #[arg(short, long)]
        period_ms: Option<u64>,
    },
    /// Print an ASCII rendering of the first generated heightmap
    Preview {
        /// RNG seed
        #[arg(short, long)]
        seed: Option<u64>,
        /// Output width in characters
        #[arg(short, long, default_value = "64")]
        columns: u32,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SessionConfig> {
    Ok(match path {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("blockfield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("heightmap: {}", blockfield_heightmap::crate_info());
            println!("layout: {}", blockfield_layout::crate_info());
            println!("render: {}", blockfield_render::crate_info());
            println!("session: {}", blockfield_session::crate_info());
        }
        Commands::Simulate {
            duration_ms,
            seed,
            period_ms,
        } => {
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(period) = period_ms {
                config.regen_period_ms = period;
            }
            simulate(config, duration_ms)?;
        }
        Commands::Preview { seed, columns } => {
            if let Some(seed) = seed {
                config.seed = seed;
            }
            config.generate_on_mount = true;
            anyhow::ensure!(columns > 0, "columns must be positive");

            let mut session = Session::new(config)?;
            session.mount(Duration::ZERO);
            let raster = session
                .raster()
                .ok_or_else(|| anyhow::anyhow!("no raster after mount"))?;
            let stats = raster.stats();
            println!(
                "seed={} min={} max={} mean={:.1}",
                session.config().seed,
                stats.min,
                stats.max,
                stats.mean
            );
            print!("{}", ascii_preview(raster, columns));
        }
    }

    Ok(())
}

fn simulate(config: SessionConfig, duration_ms: u64) -> anyhow::Result<()> {
    println!(
        "Simulating: seed={}, period={}ms, duration={}ms",
        config.seed, config.regen_period_ms, duration_ms
    );

    let mut session = Session::new(config)?;
    println!("instances: {}", session.layout().len());
    session.mount(Duration::ZERO);

    let mut publishes = 0u32;
    let mut last_seen = None;
    let mut now_ms = 0;
    loop {
        session.advance(Duration::from_millis(now_ms));
        if let (Some(texture), Some(raster)) = (session.bridge().current(), session.raster()) {
            if last_seen != Some(texture.id()) {
                last_seen = Some(texture.id());
                publishes += 1;
                let stats = raster.stats();
                println!(
                    "t={now_ms:>6}ms texture=#{:<4} min={:>3} max={:>3} mean={:>6.1}",
                    texture.id().0,
                    stats.min,
                    stats.max,
                    stats.mean
                );
            }
        }
        if now_ms >= duration_ms {
            break;
        }
        now_ms = (now_ms + SIM_STEP_MS).min(duration_ms);
    }

    println!("publishes: {publishes}");
    let renderer = DebugTextRenderer::new();
    print!("{}", renderer.render(session.scene(), &session.scene().view));
    session.teardown();
    Ok(())
}

/// Downsample to `columns` characters wide. Rows are halved to roughly
/// correct for terminal cell aspect.
fn ascii_preview(raster: &HeightRaster, columns: u32) -> String {
    let columns = columns.min(raster.width());
    let rows = (columns / 2).max(1);
    let mut out = String::with_capacity(((columns + 1) * rows) as usize);
    for row in 0..rows {
        let y = (row * 2 + 1) * raster.height() / (rows * 2);
        for col in 0..columns {
            let x = (col * 2 + 1) * raster.width() / (columns * 2);
            let v = raster.intensity(x, y) as usize;
            let idx = v * (ASCII_RAMP.len() - 1) / u8::MAX as usize;
            out.push(ASCII_RAMP[idx] as char);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_preview_dimensions() {
        let raster = HeightRaster::new();
        let text = ascii_preview(&raster, 32);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 16);
        assert!(lines.iter().all(|l| l.len() == 32));
        assert!(text.chars().all(|c| c == ' ' || c == '\n'));
    }

    #[test]
    fn ascii_preview_maps_full_intensity_to_brightest() {
        let mut raster = HeightRaster::new();
        for y in 0..raster.height() {
            for x in 0..raster.width() {
                raster.set_intensity(x, y, 255);
            }
        }
        let text = ascii_preview(&raster, 8);
        assert!(text.lines().all(|l| l == "@@@@@@@@"));
    }

    #[test]
    fn ascii_preview_clamps_columns() {
        let raster = HeightRaster::new();
        let text = ascii_preview(&raster, 10_000);
        assert_eq!(text.lines().next().map(str::len), Some(256));
    }
}
