use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crackdown_radar::baseline::BaselineWindow;
use crackdown_radar::config::RadarConfig;
use crackdown_radar::pipeline;
use crackdown_radar::sink::{self, DirectorySink};
use crackdown_radar::source::{FileSource, RecordSource, SocrataSource};

#[derive(Parser, Debug)]
#[command(name = "crackdown-radar", version, about = "Daily incident counts and enforcement surge detection")]
struct Cli {
    /// TOML config file; flags below override it
    #[arg(long = "config", short = 'c')]
    config: Option<PathBuf>,

    /// Read records from a JSON / JSON-lines export instead of the API
    #[arg(long = "input", short = 'i')]
    input: Option<PathBuf>,

    /// Re-run detection over a saved daily_counts.json, skipping the fetch
    #[arg(long = "from-counts", conflicts_with = "input")]
    from_counts: Option<PathBuf>,

    /// Directory receiving daily_counts.json and summary.json
    #[arg(long = "output-dir", short = 'o')]
    output_dir: Option<PathBuf>,

    #[arg(long = "days-back")] days_back: Option<u32>,
    #[arg(long = "threshold-sigma")] threshold_sigma: Option<f64>,
    #[arg(long = "baseline-days")] baseline_days: Option<usize>,
    #[arg(long = "recent-days")] recent_days: Option<usize>,
    #[arg(long = "top")] top: Option<usize>,

    /// Leave the day under test out of its own baseline window
    #[arg(long = "exclude-tested", default_value_t = false)]
    exclude_tested: bool,

    /// Also print summary.json to stdout
    #[arg(long = "print-summary", default_value_t = false)]
    print_summary: bool,
}

impl Cli {
    fn apply(&self, cfg: &mut RadarConfig) {
        if let Some(d) = &self.output_dir { cfg.output_dir = d.clone(); }
        if let Some(v) = self.days_back { cfg.days_back = v; }
        if let Some(v) = self.threshold_sigma { cfg.threshold_sigma = v; }
        if let Some(v) = self.baseline_days { cfg.baseline_days = v; }
        if let Some(v) = self.recent_days { cfg.recent_days = v; }
        if let Some(v) = self.top { cfg.top_n = v; }
        if self.exclude_tested { cfg.baseline_window = BaselineWindow::ExcludeTested; }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RADAR_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => RadarConfig::load(path)?,
        None => RadarConfig::default(),
    };
    cli.apply(&mut cfg);

    let sink = DirectorySink::new(&cfg.output_dir);

    let report = if let Some(path) = &cli.from_counts {
        let table = sink::read_daily_counts(path)?;
        pipeline::rerun(table, &sink, &cfg, Utc::now()).context("crackdown radar rerun failed")?
    } else {
        let source: Box<dyn RecordSource> = match &cli.input {
            Some(path) => Box::new(FileSource::new(path)),
            None => Box::new(SocrataSource::new(cfg.source.clone(), cfg.fields.date.clone())),
        };
        pipeline::run(source.as_ref(), &sink, &cfg, Utc::now()).context("crackdown radar run failed")?
    };

    println!("Data saved to {}", sink.dir().display());
    print!("{}", report.digest());
    if cli.print_summary {
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
    }
    Ok(())
}
