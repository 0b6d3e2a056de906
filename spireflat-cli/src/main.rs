mod input;
mod reporter;
mod table;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};

use reporter::ConsoleReporter;
use spireflat_game::{FlattenConfig, FloorRecord, RunFlattener, ValidationMode, flatten_batch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One header row plus one row per floor
    Csv,
    /// A JSON array with one object per floor
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "spireflat", version)]
#[command(about = "Flatten Slay the Spire run logs into one record per floor")]
struct Args {
    /// Run collection: a JSON array of run envelopes, or one envelope per line
    input: PathBuf,

    /// Optional path to write the table to instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Report progress every N runs (0 disables progress lines)
    #[arg(long, default_value_t = 10_000)]
    progress_every: usize,

    /// Engine configuration file (JSON); omitted keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip entries with a missing or out-of-range floor instead of dropping the rest of their category
    #[arg(long)]
    lenient: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    announce_banner();

    let config = resolve_config(&args)?;
    let runs = input::load_runs(&args.input)?;
    log::info!("loaded {} runs from {}", runs.len(), args.input.display());

    let flattener = RunFlattener::new(config);
    let mut reporter = ConsoleReporter::new(std::io::stderr(), args.verbose);
    let outcome = flatten_batch(&runs, &flattener, &mut reporter, args.progress_every);

    write_output(&args, &outcome.records)?;
    Ok(())
}

fn announce_banner() {
    eprintln!("{}", "🗼 Spireflat Run Flattener".bright_cyan().bold());
    eprintln!("{}", "================================".cyan());
}

fn resolve_config(args: &Args) -> Result<FlattenConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => FlattenConfig::default_config(),
    };
    if args.lenient {
        config = config.with_validation(ValidationMode::Lenient);
    }
    if config.boss_path_symbols.is_empty() {
        bail!("configuration must name at least one boss path symbol");
    }
    Ok(config)
}

fn load_config(path: &Path) -> Result<FlattenConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    FlattenConfig::from_json(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

fn write_output(args: &Args, records: &[FloorRecord]) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.format {
        OutputFormat::Csv => table::write_csv(&mut output_target, records)?,
        OutputFormat::Json => table::write_json(&mut output_target, records)?,
    }
    output_target.flush_inner()?;

    if let Some(path) = &args.output {
        eprintln!(
            "📁 Wrote {} floor records to {}",
            records.len(),
            path.display().to_string().green()
        );
    }
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        self.writer().flush()
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
