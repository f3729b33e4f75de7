mod commands;
mod render;
mod shell;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdin, stdout};
use std::path::{Path, PathBuf};

use mission_shop::constants::{DEFAULT_CATALOG_PATH, DEFAULT_RANKING_PATH};
use mission_shop::{
    BuiltinCatalog, Catalog, CatalogError, CatalogSource, CsvCatalog, JsonFileRanking,
    MissionEngine, MissionRules, ResultSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Short recap of every finished mission
    Console,
    /// JSON array of result summaries
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "mission-shop", version)]
#[command(about = "Shop for school supplies without going over your budget")]
struct Args {
    /// CSV catalog with `name,price[,image_url]` columns (defaults to ./catalog.csv, then built-in items)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Ranking file, created on first use
    #[arg(long, default_value = DEFAULT_RANKING_PATH)]
    ranking: PathBuf,

    /// JSON file with mission rules
    #[arg(long)]
    config: Option<PathBuf>,

    /// Play without scores (also disables the ranking)
    #[arg(long)]
    no_scoring: bool,

    /// Do not offer to save scores
    #[arg(long)]
    no_ranking: bool,

    /// Missions never time out
    #[arg(long)]
    no_timer: bool,

    /// Accept any budget instead of the difficulty tiers
    #[arg(long)]
    free_budget: bool,

    /// Report printed after the session ends
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report to instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the ranking and exit
    #[arg(long)]
    show_ranking: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Catalog chosen on the command line.
enum CliCatalog {
    Builtin,
    Csv(CsvCatalog),
}

impl CliCatalog {
    /// `--catalog` wins; otherwise a `catalog.csv` in the working directory;
    /// otherwise the built-in table.
    fn from_args(args: &Args) -> Self {
        match &args.catalog {
            Some(path) => Self::Csv(CsvCatalog::new(path)),
            None if Path::new(DEFAULT_CATALOG_PATH).is_file() => {
                log::info!("using {DEFAULT_CATALOG_PATH} from the working directory");
                Self::Csv(CsvCatalog::new(DEFAULT_CATALOG_PATH))
            }
            None => Self::Builtin,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Builtin => "the built-in catalog".to_string(),
            Self::Csv(source) => format!("catalog {}", source.path().display()),
        }
    }
}

impl CatalogSource for CliCatalog {
    fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match self {
            Self::Builtin => BuiltinCatalog.load_catalog(),
            Self::Csv(source) => source.load_catalog(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let rules = build_rules(&args)?;
    log::debug!("mission rules: {rules:?}");
    let source = CliCatalog::from_args(&args);
    let catalog_label = source.describe();
    let mut engine = MissionEngine::new(source, JsonFileRanking::new(&args.ranking), rules)?;

    if args.show_ranking {
        let entries = engine
            .ranking()
            .with_context(|| format!("cannot show the ranking in {}", args.ranking.display()))?;
        let mut output_target = OutputTarget::new(args.output.clone())?;
        render::ranking(output_target.writer(), &entries)?;
        output_target.flush_inner()?;
        return Ok(());
    }

    announce_banner();
    let mut controller = engine
        .create_controller()
        .with_context(|| format!("failed to load {catalog_label}"))?;

    let finished = {
        let mut out = stdout().lock();
        shell::run(&mut controller, stdin().lock(), &mut out, Utc::now)?
    };

    let mut output_target = OutputTarget::new(args.output.clone())?;
    write_report(&mut output_target, args.report, &finished)?;
    output_target.flush_inner()?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn announce_banner() {
    println!("{}", "🛍️  Mission Shop".bright_cyan().bold());
    println!("{}", "================".cyan());
}

/// Rules from the optional config file, then narrowed by the flags.
fn build_rules(args: &Args) -> Result<MissionRules> {
    let mut rules = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            MissionRules::from_json(&text)
                .with_context(|| format!("invalid rules in {}", path.display()))?
        }
        None => MissionRules::default(),
    };
    if args.no_scoring {
        rules.scoring_enabled = false;
        rules.ranking_enabled = false;
    }
    if args.no_ranking {
        rules.ranking_enabled = false;
    }
    if args.no_timer {
        rules.timer_enabled = false;
    }
    if args.free_budget {
        rules.enforce_budget_tiers = false;
    }
    Ok(rules)
}

fn write_report(
    out: &mut dyn Write,
    format: ReportFormat,
    finished: &[ResultSummary],
) -> Result<()> {
    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, finished)?;
            writeln!(out)?;
        }
        ReportFormat::Console => {
            writeln!(out)?;
            if finished.is_empty() {
                writeln!(out, "No missions finished. See you next time!")?;
            }
            for summary in finished {
                let verdict = if summary.success {
                    "success".green()
                } else {
                    "failed".red()
                };
                write!(
                    out,
                    "🏁 {} ({}): spent {} of {}, {verdict}",
                    summary.player_name,
                    summary.difficulty,
                    render::format_won(summary.total),
                    render::format_won(i64::from(summary.budget)),
                )?;
                if let Some(score) = summary.score {
                    write!(out, ", score {score}")?;
                }
                writeln!(out)?;
            }
        }
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
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
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
