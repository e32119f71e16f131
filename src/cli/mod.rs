//! Command-line interface for datecheck.
//!
//! Provides commands for evaluating a model, sweeping temperatures,
//! trying the extractor and scorer by hand, and building fact files.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::adapters::wikipedia::parse_month_day;
use crate::adapters::{ModelClient, OllamaClient, OnThisDayClient};
use crate::config::{self, ResolvedConfig};
use crate::core::questions::DEFAULT_CONTEXT;
use crate::core::{score, Harness, PromptStyle, ReportStore};
use crate::domain::{CanonicalDate, ExtractionResult, Fact};
use crate::extraction::DateExtractor;
use crate::facts::{
    sample_facts, write_facts_jsonl, FactSource, FactStats, JsonlFactFile, SampleFacts,
};

/// datecheck - Historical date recall evaluation for local LLMs
#[derive(Parser, Debug)]
#[command(name = "datecheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a model against a set of facts
    Run {
        #[command(flatten)]
        source: FactSourceArgs,

        #[command(flatten)]
        model: ModelArgs,

        /// Sampling temperature
        #[arg(short, long)]
        temperature: Option<f64>,

        /// Facts evaluated at once
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Directory for the JSONL report (defaults to <home>/reports)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the summary without writing a report
        #[arg(long)]
        no_save: bool,
    },

    /// Measure accuracy across a range of temperatures
    Sweep {
        #[command(flatten)]
        source: FactSourceArgs,

        #[command(flatten)]
        model: ModelArgs,

        /// Comma-separated temperatures (e.g. 0.5,0.7,1.0)
        #[arg(long, value_delimiter = ',')]
        temperatures: Vec<f64>,

        /// Queries per fact and temperature
        #[arg(long)]
        trials: Option<u32>,

        /// Directory for the sweep report (defaults to <home>/reports)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract a date from text (reads stdin if no text is given)
    Extract {
        /// Text to search
        text: Option<String>,
    },

    /// Score an extracted date against the ground truth
    Score {
        /// Extracted date (YYYY-MM-DD), or "none"
        extracted: String,

        /// Ground-truth date (YYYY-MM-DD)
        truth: String,
    },

    /// Build a fact file from Wikipedia "On This Day"
    Facts {
        /// Single day to fetch (MM/DD)
        #[arg(long, conflicts_with = "all")]
        date: Option<String>,

        /// Fetch every day of the year
        #[arg(long)]
        all: bool,

        /// Keep only events from this year
        #[arg(long)]
        year: Option<i32>,

        /// Oldest year kept
        #[arg(long, default_value = "1000")]
        min_year: i32,

        /// Newest year kept (defaults to the current year)
        #[arg(long)]
        max_year: Option<i32>,

        /// Pause between day requests, in milliseconds
        #[arg(long, default_value = "500")]
        delay_ms: u64,

        /// Output JSONL file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Where the evaluated facts come from
#[derive(Args, Debug, Clone, Default)]
pub struct FactSourceArgs {
    /// JSONL fact file
    #[arg(short, long, conflicts_with_all = ["sample", "on_this_day"])]
    pub facts: Option<PathBuf>,

    /// Use the built-in sample facts (the default)
    #[arg(long, conflicts_with = "on_this_day")]
    pub sample: bool,

    /// Fetch facts for one day (MM/DD) from Wikipedia
    #[arg(long)]
    pub on_this_day: Option<String>,

    /// Number of facts drawn at random (defaults to the configured sample size)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Evaluate every loaded fact
    #[arg(long, conflicts_with = "limit")]
    pub all_facts: bool,
}

/// Model server overrides
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Model name (e.g. gemma3:1b)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Prompt style
    #[arg(long, value_enum)]
    pub style: Option<StyleArg>,

    /// Fixed generation seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip the model server health check
    #[arg(long)]
    pub skip_health_check: bool,
}

/// Prompt style for CLI (maps to PromptStyle)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StyleArg {
    /// Keyword-selected question with the system instruction
    Question,

    /// Fixed preamble followed by the event text
    Context,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run {
                source,
                model,
                temperature,
                concurrency,
                output,
                no_save,
            } => run_evaluation(source, model, temperature, concurrency, output, no_save).await,
            Commands::Sweep {
                source,
                model,
                temperatures,
                trials,
                output,
            } => run_sweep(source, model, temperatures, trials, output).await,
            Commands::Extract { text } => extract_text(text),
            Commands::Score { extracted, truth } => score_dates(&extracted, &truth),
            Commands::Facts {
                date,
                all,
                year,
                min_year,
                max_year,
                delay_ms,
                output,
            } => fetch_facts(date, all, year, min_year, max_year, delay_ms, output).await,
            Commands::Config => show_config(),
        }
    }
}

/// Load the requested facts and draw the evaluation sample
async fn load_facts(args: &FactSourceArgs, cfg: &ResolvedConfig) -> Result<Vec<Fact>> {
    let source: Box<dyn FactSource> = if let Some(path) = &args.facts {
        Box::new(JsonlFactFile::new(path))
    } else if let Some(day) = &args.on_this_day {
        let (month, day) = parse_month_day(day)?;
        Box::new(OnThisDayClient::new()?.for_day(month, day))
    } else {
        Box::new(SampleFacts)
    };

    let facts = source
        .load()
        .await
        .with_context(|| format!("Failed to load facts from {}", source.name()))?;
    if facts.is_empty() {
        anyhow::bail!("No facts loaded from {}", source.name());
    }

    if args.all_facts {
        return Ok(facts);
    }

    let count = args.limit.unwrap_or(cfg.sample_size);
    let picked = sample_facts(&facts, count, &mut rand::thread_rng());
    eprintln!(
        "Evaluating {} of {} facts from {}",
        picked.len(),
        facts.len(),
        source.name()
    );
    Ok(picked)
}

/// Build a harness from configuration plus CLI overrides
async fn build_harness(
    cfg: &ResolvedConfig,
    args: &ModelArgs,
    temperature: Option<f64>,
    concurrency: Option<usize>,
) -> Result<Harness> {
    let client = OllamaClient::new(&cfg.model.base_url, cfg.model.timeout_seconds)?;

    if !args.skip_health_check {
        client.health_check().await.with_context(|| {
            format!(
                "Model server at {} is not reachable (is `ollama serve` running?)",
                client.base_url()
            )
        })?;
    }

    let mut harness_config = cfg.harness_config();
    if let Some(model) = &args.model {
        harness_config.model = model.clone();
    }
    if let Some(style) = args.style {
        harness_config.prompt_style = match style {
            StyleArg::Question => PromptStyle::Question,
            StyleArg::Context => match &cfg.prompt_style {
                PromptStyle::Context { preamble } => PromptStyle::Context {
                    preamble: preamble.clone(),
                },
                PromptStyle::Question => PromptStyle::Context {
                    preamble: DEFAULT_CONTEXT.to_string(),
                },
            },
        };
    }
    if let Some(seed) = args.seed {
        harness_config.params.seed = Some(seed);
    }
    if let Some(t) = temperature {
        if !(0.0..=2.0).contains(&t) {
            anyhow::bail!("Temperature {} is outside 0.0..=2.0", t);
        }
        harness_config.params.temperature = t;
    }
    if let Some(n) = concurrency {
        harness_config.max_concurrency = n.max(1);
    }

    Ok(Harness::new(Arc::new(client), harness_config).with_questions(cfg.question_generator()))
}

/// Evaluate a model and persist the report
async fn run_evaluation(
    source: FactSourceArgs,
    model: ModelArgs,
    temperature: Option<f64>,
    concurrency: Option<usize>,
    output: Option<PathBuf>,
    no_save: bool,
) -> Result<()> {
    let cfg = config::config()?;
    let facts = load_facts(&source, cfg).await?;
    let harness = build_harness(cfg, &model, temperature, concurrency).await?;

    let report = harness.run(&facts).await?;
    report.print_summary();

    if !no_save {
        let store = ReportStore::open(output.unwrap_or_else(|| cfg.reports_dir())).await?;
        let path = store.write(&report).await?;
        eprintln!("\n[Report written to {}]", path.display());
    }

    Ok(())
}

/// Sweep temperatures and persist the results
async fn run_sweep(
    source: FactSourceArgs,
    model: ModelArgs,
    temperatures: Vec<f64>,
    trials: Option<u32>,
    output: Option<PathBuf>,
) -> Result<()> {
    let cfg = config::config()?;

    let temperatures = if temperatures.is_empty() {
        cfg.sweep.temperatures.clone()
    } else {
        temperatures
    };
    if let Some(t) = temperatures.iter().find(|t| !(0.0..=2.0).contains(*t)) {
        anyhow::bail!("Temperature {} is outside 0.0..=2.0", t);
    }
    let trials = trials.unwrap_or(cfg.sweep.trials);

    let facts = load_facts(&source, cfg).await?;
    let harness = build_harness(cfg, &model, None, None).await?;

    let report = harness.sweep(&facts, &temperatures, trials).await?;
    report.print_summary();

    let store = ReportStore::open(output.unwrap_or_else(|| cfg.reports_dir())).await?;
    let path = store.write_sweep(&report).await?;
    eprintln!("\n[Sweep written to {}]", path.display());

    Ok(())
}

/// Run the extractor over text and print what it found
fn extract_text(text: Option<String>) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None if !io::stdin().is_terminal() => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            buffer
        }
        None => anyhow::bail!("No input provided. Pass text or pipe to stdin"),
    };

    match DateExtractor::default().find(&text) {
        Some(found) => {
            println!("{}", found.date);
            println!("  pattern: {}", found.kind);
            println!("  matched: {:?} at byte {}", found.matched, found.offset);
        }
        None => println!("none"),
    }

    Ok(())
}

/// Score two dates given on the command line
fn score_dates(extracted: &str, truth: &str) -> Result<()> {
    let extraction = if extracted.eq_ignore_ascii_case("none") {
        ExtractionResult::NotFound
    } else {
        ExtractionResult::Found(
            extracted
                .parse()
                .with_context(|| format!("Invalid extracted date: {}", extracted))?,
        )
    };
    let truth: CanonicalDate = truth
        .parse()
        .with_context(|| format!("Invalid ground-truth date: {}", truth))?;

    let result = score(&extraction, Some(&truth));
    println!("Year correct: {}", result.is_year_correct);
    println!("Confidence:   {:.2}", result.confidence);

    Ok(())
}

/// Scrape On This Day into a JSONL fact file
async fn fetch_facts(
    date: Option<String>,
    all: bool,
    year: Option<i32>,
    min_year: i32,
    max_year: Option<i32>,
    delay_ms: u64,
    output: PathBuf,
) -> Result<()> {
    let max_year = max_year.unwrap_or_else(|| Utc::now().year());
    let client = OnThisDayClient::new()?.with_year_range(min_year, max_year);

    let facts = match (date, all) {
        (Some(day), _) => {
            let (month, day) = parse_month_day(&day)?;
            let facts = client.fetch_day(month, day).await?;
            facts
                .into_iter()
                .filter(|f| year.map_or(true, |y| f.date.year() == y))
                .collect()
        }
        (None, true) => {
            client
                .fetch_all_days(year, Duration::from_millis(delay_ms))
                .await
        }
        (None, false) => anyhow::bail!("Pass --date MM/DD or --all"),
    };

    if facts.is_empty() {
        anyhow::bail!("No events matched; nothing written");
    }

    write_facts_jsonl(&output, &facts).await?;
    println!("Wrote {} facts to {}", facts.len(), output.display());

    let stats = FactStats::from_facts(&facts);
    println!("\nEvents by category:");
    for (category, count) in &stats.by_category {
        println!("  {}: {}", category, count);
    }
    if let Some((oldest, newest)) = stats.year_range {
        println!("Year range: {} - {}", oldest, newest);
    }

    Ok(())
}

/// Print the resolved configuration
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("  datecheck Configuration");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:    {}", cfg.home.display());
    println!("  Reports: {}", cfg.reports_dir().display());
    println!("  Facts:   {}", cfg.facts_dir().display());
    println!();
    println!("Model:");
    println!("  Server:  {}", cfg.model.base_url);
    println!("  Name:    {}", cfg.model.name);
    println!("  Timeout: {}s", cfg.model.timeout_seconds);
    println!();
    println!("Generation:");
    println!("  Temperature: {}", cfg.generation.temperature);
    println!("  Max tokens:  {}", cfg.generation.max_tokens);
    println!(
        "  Seed:        {}",
        cfg.generation
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "(random per query)".to_string())
    );
    println!();
    println!("Harness:");
    match &cfg.prompt_style {
        PromptStyle::Question => println!("  Prompt style: question"),
        PromptStyle::Context { preamble } => println!("  Prompt style: context ({:?})", preamble),
    }
    println!("  Concurrency:  {}", cfg.max_concurrency);
    println!("  Sample size:  {}", cfg.sample_size);
    println!("  Extra rules:  {}", cfg.question_rules.len());
    println!();
    println!("Sweep:");
    println!("  Temperatures: {:?}", cfg.sweep.temperatures);
    println!("  Trials:       {}", cfg.sweep.trials);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "datecheck",
            "run",
            "--facts",
            "facts.jsonl",
            "--limit",
            "3",
            "--model",
            "gemma3n:e4b",
            "--temperature",
            "0.7",
            "--style",
            "context",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                source,
                model,
                temperature,
                ..
            } => {
                assert_eq!(source.facts, Some(PathBuf::from("facts.jsonl")));
                assert_eq!(source.limit, Some(3));
                assert_eq!(model.model.as_deref(), Some("gemma3n:e4b"));
                assert!(matches!(model.style, Some(StyleArg::Context)));
                assert_eq!(temperature, Some(0.7));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_sweep_temperatures() {
        let cli =
            Cli::try_parse_from(["datecheck", "sweep", "--temperatures", "0.5,0.7,1.0"]).unwrap();
        match cli.command {
            Commands::Sweep { temperatures, .. } => {
                assert_eq!(temperatures, vec![0.5, 0.7, 1.0]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_fact_sources_conflict() {
        let result = Cli::try_parse_from([
            "datecheck",
            "run",
            "--facts",
            "f.jsonl",
            "--on-this-day",
            "06/30",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_score_command_rejects_bad_date() {
        assert!(score_dates("1969-07-20", "1969-02-30").is_err());
        assert!(score_dates("none", "1969-07-20").is_ok());
    }
}
