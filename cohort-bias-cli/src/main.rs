//! `cohort-bias` command-line front end.
//!
//! Reads a CSV file (or stdin), runs the demographic bias analysis and prints
//! the report as JSON, console text or Markdown.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn, Level};

use cohort_bias::analyzers::{
    AnalysisRunner, ColumnAliases, DEFAULT_AGE_ALIASES, DEFAULT_GENDER_ALIASES,
};
use cohort_bias::core::Dataset;
use cohort_bias::formatters::{
    FormatterConfig, HumanFormatter, JsonFormatter, MarkdownFormatter, ReportFormatter,
};
use cohort_bias::insight::{analyze_with_insight, InsightClient, InsightConfig, InsightGenerator};
use cohort_bias::logging::setup::{init_logging, LoggingConfig};
use cohort_bias::logging::LogConfig;
use cohort_bias::sources::{CsvOptions, CsvSource, DataSource};
use cohort_bias::BiasError;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors; never log data operations
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a CSV file for gender and age bias
    Analyze(AnalyzeArgs),
    /// Print the default column alias lists
    Aliases,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// CSV file to analyze, or `-` for stdin
    file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,

    /// Field delimiter
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Gender column alias, in priority order (replaces the defaults)
    #[arg(long = "gender-alias", value_name = "NAME")]
    gender_aliases: Vec<String>,

    /// Age column alias, in priority order (replaces the defaults)
    #[arg(long = "age-alias", value_name = "NAME")]
    age_aliases: Vec<String>,

    /// Ask the configured chat model for a narrative assessment
    #[arg(long)]
    insight: bool,

    /// TOML file with insight settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable ANSI colors in human output
    #[arg(long)]
    no_color: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Human,
    Markdown,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = if cli.verbose {
        LoggingConfig::development()
    } else if cli.quiet {
        LoggingConfig::default().with_crate_level(Level::WARN)
    } else {
        LoggingConfig::default()
    };
    if let Err(e) = init_logging(logging.with_json_format(cli.json_logs)) {
        eprintln!("warning: failed to initialize logging: {e}");
    }

    let log_config = analysis_log_config(&cli);
    let result = match cli.command {
        Command::Analyze(args) => analyze(&args, log_config).await,
        Command::Aliases => {
            print!("{}", aliases_text());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            if let Some(BiasError::Schema {
                available_columns, ..
            }) = e.downcast_ref::<BiasError>()
            {
                eprintln!("columns in input: {}", available_columns.join(", "));
            }
            ExitCode::FAILURE
        }
    }
}

async fn analyze(args: &AnalyzeArgs, log_config: LogConfig) -> Result<()> {
    let dataset = load_dataset(&args.file, csv_options(args)?)?;
    let runner = build_runner(args, log_config);

    let generator = if args.insight {
        insight_generator(args.config.as_deref())
    } else {
        None
    };

    let result = analyze_with_insight(&runner, &dataset, generator.as_deref()).await?;
    if let Some(error) = result.insight_error() {
        eprintln!("warning: insight unavailable: {error}");
    }

    let formatter = formatter(args);
    let output = if args.insight {
        formatter.format_with_insight(&result)?
    } else {
        formatter.format(&result.report)?
    };
    println!("{}", output.trim_end());
    Ok(())
}

fn csv_options(args: &AnalyzeArgs) -> Result<CsvOptions> {
    if !args.delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got '{}'", args.delimiter);
    }
    Ok(CsvOptions::default().with_delimiter(args.delimiter as u8))
}

fn load_dataset(path: &Path, options: CsvOptions) -> Result<Dataset> {
    let source = if path.as_os_str() == "-" {
        let mut body = Vec::new();
        std::io::stdin()
            .read_to_end(&mut body)
            .context("failed to read stdin")?;
        CsvSource::from_bytes(body)
    } else {
        CsvSource::from_path(path)
    };

    let dataset = source
        .with_options(options)
        .load()
        .with_context(|| format!("failed to load {}", path.display()))?;
    info!(rows = dataset.len(), columns = dataset.columns().len(), "Input loaded");
    Ok(dataset)
}

fn analysis_log_config(cli: &Cli) -> LogConfig {
    if cli.verbose {
        LogConfig::verbose()
    } else if cli.quiet {
        LogConfig::production()
    } else {
        LogConfig::default()
    }
}

fn build_runner(args: &AnalyzeArgs, log_config: LogConfig) -> AnalysisRunner {
    let mut aliases = ColumnAliases::default();
    if !args.gender_aliases.is_empty() {
        aliases = aliases.with_gender(args.gender_aliases.iter().cloned());
    }
    if !args.age_aliases.is_empty() {
        aliases = aliases.with_age(args.age_aliases.iter().cloned());
    }

    AnalysisRunner::new()
        .with_aliases(aliases)
        .with_log_config(log_config)
}

/// Builds the insight client; configuration problems only disable insight.
fn insight_generator(config_file: Option<&Path>) -> Option<Box<dyn InsightGenerator>> {
    let client = InsightConfig::load(config_file)
        .and_then(|config| InsightClient::new(config).map_err(BiasError::from));
    match client {
        Ok(client) => Some(Box::new(client)),
        Err(e) => {
            warn!("Insight disabled: {e}");
            eprintln!("warning: insight disabled: {e}");
            None
        }
    }
}

fn formatter(args: &AnalyzeArgs) -> Box<dyn ReportFormatter> {
    match args.format {
        OutputFormat::Json => Box::new(JsonFormatter::new().with_pretty(!args.compact)),
        OutputFormat::Human => Box::new(HumanFormatter::with_config(
            FormatterConfig::default().with_colors(!args.no_color),
        )),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::with_config(
            FormatterConfig::default().with_timestamps(false),
        )),
    }
}

fn aliases_text() -> String {
    format!(
        "gender: {}\nage: {}\n",
        DEFAULT_GENDER_ALIASES.join(", "),
        DEFAULT_AGE_ALIASES.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse_cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn parse(args: &[&str]) -> AnalyzeArgs {
        match parse_cli(args).command {
            Command::Analyze(args) => args,
            other => panic!("expected analyze, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_analyze_defaults() {
        let args = parse(&["cohort-bias", "analyze", "cohort.csv"]);
        assert_eq!(args.file, PathBuf::from("cohort.csv"));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.delimiter, ',');
        assert!(!args.insight);
        assert!(args.gender_aliases.is_empty());
    }

    #[test]
    fn test_parse_repeated_aliases() {
        let args = parse(&[
            "cohort-bias",
            "analyze",
            "data.tsv",
            "--format",
            "markdown",
            "--delimiter",
            "\t",
            "--gender-alias",
            "bio_sex",
            "--gender-alias",
            "sex",
            "--age-alias",
            "age_years",
        ]);
        assert_eq!(args.format, OutputFormat::Markdown);
        assert_eq!(args.gender_aliases, vec!["bio_sex", "sex"]);

        let runner = build_runner(&args, LogConfig::default());
        assert_eq!(runner.aliases().gender, vec!["bio_sex", "sex"]);
        assert_eq!(runner.aliases().age, vec!["age_years"]);
        assert_eq!(csv_options(&args).unwrap().delimiter, b'\t');
    }

    #[test]
    fn test_quiet_and_verbose_log_configs() {
        let config_for = |args: &[&str]| analysis_log_config(&parse_cli(args));

        let quiet = config_for(&["cohort-bias", "-q", "analyze", "x.csv"]);
        assert!(!quiet.data_operations_enabled());
        assert!(!quiet.value_details_enabled());

        let verbose = config_for(&["cohort-bias", "analyze", "x.csv", "-v"]);
        assert!(verbose.value_details_enabled());

        let default = config_for(&["cohort-bias", "analyze", "x.csv"]);
        assert!(default.data_operations_enabled());
        assert!(!default.value_details_enabled());

        assert!(Cli::try_parse_from(["cohort-bias", "-q", "-v", "aliases"]).is_err());
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let args = parse(&["cohort-bias", "analyze", "x.csv", "--delimiter", "§"]);
        assert!(csv_options(&args).is_err());
    }

    #[test]
    fn test_load_dataset_and_schema_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,score\nalice,3").unwrap();

        let dataset = load_dataset(file.path(), CsvOptions::default()).unwrap();
        let args = parse(&["cohort-bias", "analyze", "x.csv"]);
        let err = build_runner(&args, LogConfig::default()).run(&dataset).unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load_dataset(Path::new("/nonexistent/cohort.csv"), CsvOptions::default())
            .unwrap_err();
        assert!(format!("{err:#}").contains("failed to load /nonexistent/cohort.csv"));
    }

    #[test]
    fn test_aliases_text() {
        let text = aliases_text();
        assert!(text.starts_with("gender: gender, sex, gndr, g, s\n"));
        assert!(text.contains("age: age, years, patient_age, subject_age, pat_age"));
    }
}
