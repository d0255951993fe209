use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use shift_counts::config::EngineConfig;
use shift_counts::model::{Quarter, ShiftDate, ShiftType};
use shift_counts::{CountsError, Result, batch, delta, import, sync, trend};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shift_counts=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| CountsError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let config = EngineConfig::with_base_dir(&cli.base_dir);
    match cli.command {
        Command::Submit(args) => execute_submit(&config, args),
        Command::Import(args) => execute_import(&config, args),
        Command::Delta(args) => execute_delta(&config, args),
        Command::Trend => execute_trend(&config),
    }
}

fn execute_submit(config: &EngineConfig, args: SubmitArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(CountsError::MissingInput(args.input));
    }

    let date = match args.date {
        Some(date) => date,
        None => ShiftDate::new(chrono::Local::now().date_naive()),
    };
    let quarter = Quarter::from(args.quarter);
    let records = batch::records_from_json(quarter, &load_json(&args.input)?)?;

    let store = config.store();
    let mut dataset = store.load();
    let report = sync::submit(
        config,
        date,
        args.shift.into(),
        quarter,
        records,
        &mut dataset,
        &store,
    )?;

    println!(
        "Data for {} saved to {} ({} records)",
        report.quarter,
        report.document.display(),
        report.record_count
    );
    for failure in report.failures() {
        println!("warning: {failure}");
    }
    Ok(())
}

fn execute_import(config: &EngineConfig, args: ImportArgs) -> Result<()> {
    let store = config.store();
    let mut dataset = store.load();
    let report = import::import_latest(&args.files, &mut dataset, &store)?;
    println!(
        "Data imported from {} ({} records)",
        report.source.display(),
        report.record_count()
    );
    Ok(())
}

fn execute_delta(config: &EngineConfig, args: DeltaArgs) -> Result<()> {
    let dataset = config.store().load();
    let report = delta::compute_delta(&dataset, args.from.into(), args.to.into());
    println!("{}", report.summary);
    Ok(())
}

fn execute_trend(config: &EngineConfig) -> Result<()> {
    let dataset = config.store().load();
    let trend = trend::piles_trend(&dataset);
    if trend.is_empty() {
        println!("No RSP total piles recorded yet.");
    }
    for (quarter, piles) in trend {
        println!("{quarter}: {piles}");
    }
    Ok(())
}

fn load_json(path: &Path) -> Result<Value> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Record shift counts per quarter and reconcile them into the shift workbook."
)]
struct Cli {
    /// Directory holding the exports folder and the shift data store.
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit the counts of one quarter.
    Submit(SubmitArgs),
    /// Import the most recent of the given workbooks into the store.
    Import(ImportArgs),
    /// Compare the stored counts of two quarters.
    Delta(DeltaArgs),
    /// Show RSP total piles per quarter.
    Trend,
}

#[derive(clap::Args)]
struct SubmitArgs {
    /// Shift date, YYYY-MM-DD. Defaults to today.
    #[arg(long, value_parser = parse_date)]
    date: Option<ShiftDate>,

    /// Shift type.
    #[arg(long, value_enum, default_value_t = ShiftKind::Day)]
    shift: ShiftKind,

    /// Quarter the counts belong to.
    #[arg(long, value_enum)]
    quarter: QuarterArg,

    /// JSON file holding a list of records or a form object.
    #[arg(long)]
    input: PathBuf,
}

#[derive(clap::Args)]
struct ImportArgs {
    /// Workbooks to choose from; all must live in the same folder.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(clap::Args)]
struct DeltaArgs {
    /// Earlier quarter.
    #[arg(long, value_enum)]
    from: QuarterArg,

    /// Later quarter.
    #[arg(long, value_enum)]
    to: QuarterArg,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum QuarterArg {
    #[value(name = "SoS", alias = "sos")]
    SoS,
    #[value(name = "Q1", alias = "q1")]
    Q1,
    #[value(name = "Q2", alias = "q2")]
    Q2,
    #[value(name = "Q3", alias = "q3")]
    Q3,
    #[value(name = "EoS", alias = "eos")]
    EoS,
}

impl From<QuarterArg> for Quarter {
    fn from(arg: QuarterArg) -> Self {
        match arg {
            QuarterArg::SoS => Quarter::SoS,
            QuarterArg::Q1 => Quarter::Q1,
            QuarterArg::Q2 => Quarter::Q2,
            QuarterArg::Q3 => Quarter::Q3,
            QuarterArg::EoS => Quarter::EoS,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ShiftKind {
    Day,
    Night,
}

impl From<ShiftKind> for ShiftType {
    fn from(kind: ShiftKind) -> Self {
        match kind {
            ShiftKind::Day => ShiftType::Day,
            ShiftKind::Night => ShiftType::Night,
        }
    }
}

fn parse_date(value: &str) -> std::result::Result<ShiftDate, String> {
    value.parse::<ShiftDate>().map_err(|error| error.to_string())
}
