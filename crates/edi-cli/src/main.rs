#![deny(rust_2018_idioms)]
#![warn(clippy::all)]

//! # edi-cli
//!
//! Command-line driver for the EDI comparison engine.
//!
//! `edi parse` prints a message in the uniform segment/field model as JSON;
//! `edi compare` checks a message against a rule file and reports every
//! difference. Exit codes: `0` clean, `1` differences found, `3` fatal
//! error (unreadable input, bad rules or configuration).

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use config::CliConfig;
use edi_comparison::context::{CASE_SENSITIVE, FAIL_ON_FIRST_ERROR};
use edi_comparison::{
    ComparisonContext, ComparisonEngine, CustomValidationPass, StructuralAudit, ValidatorRegistry,
};
use edi_ir::{FileFormat, Message};
use edi_rules::{RuleLoader, RuleSet, ValidationType};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const EXIT_DIFFERENCES: u8 = 1;
const EXIT_FATAL: u8 = 3;

#[derive(Parser)]
#[command(name = "edi")]
#[command(about = "Compare EDIFACT, ANSI X12 and XML messages against declarative rules")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a message and print it as JSON
    Parse {
        /// Input file path
        input: PathBuf,

        /// Input format; detected from extension or content when omitted
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Compare a message against a rule file
    Compare {
        /// Input file path
        input: PathBuf,

        /// Rule file (YAML or JSON)
        #[arg(short, long)]
        rules: PathBuf,

        /// Reference message for `inbound.*` sources
        #[arg(long)]
        inbound: Option<PathBuf>,

        /// Test data for `testData.*` sources (YAML or JSON)
        #[arg(long)]
        test_data: Option<PathBuf>,

        /// Input format; detected from extension or content when omitted
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Print the result as JSON instead of a text report
        #[arg(long)]
        json: bool,

        /// Compare exact-match values ignoring case
        #[arg(long)]
        case_insensitive: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Edifact,
    X12,
    Xml,
}

impl From<FormatArg> for FileFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Edifact => FileFormat::Edifact,
            FormatArg::X12 => FileFormat::AnsiX12,
            FormatArg::Xml => FileFormat::Xml,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path).await?,
        None => CliConfig::default(),
    };

    match cli.command {
        Commands::Parse { input, format } => {
            let message = read_message(&input, format).await?;
            println!("{}", serde_json::to_string_pretty(&message)?);
            eprintln!(
                "Parse summary: format={}, segments={}",
                message.format(),
                message.segment_count()
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Compare {
            input,
            rules,
            inbound,
            test_data,
            format,
            json,
            case_insensitive,
        } => {
            let rule_set = RuleLoader::new()
                .load_from_file(&rules)
                .with_context(|| format!("Failed to load rules from {}", rules.display()))?;
            let message = read_message(&input, format).await?;

            let mut context = ComparisonContext::for_rule_set(&rule_set)
                .with_config(config.comparison.entries());
            if case_insensitive {
                context = context.with_flag(CASE_SENSITIVE, false);
            }
            if let Some(path) = &test_data {
                context = context.with_test_data(read_test_data(path).await?);
            }
            if let Some(path) = &inbound {
                context = context.with_inbound(read_message(path, None).await?);
            }

            let registry = ValidatorRegistry::new();
            let result = ComparisonEngine::new(&rule_set, &context).compare(&message);
            let audit = StructuralAudit::new(&rule_set, &context).run(&message);
            let mut result = result.with_additional_differences(audit);
            if registry.is_empty() {
                warn_unenforced_custom_rules(&rule_set);
            } else {
                let custom =
                    CustomValidationPass::new(&registry, &context).run(&rule_set, &message);
                result = result.with_additional_differences(custom);
            }

            if context.config_bool(FAIL_ON_FIRST_ERROR, false) {
                result = result.truncated_to_first();
            }

            info!(
                input = %input.display(),
                differences = result.difference_count(),
                "Comparison complete"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", result.detailed_report());
            }

            Ok(if result.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_DIFFERENCES)
            })
        }
    }
}

/// CUSTOM rules cannot fail without registered validators; log each one instead
fn warn_unenforced_custom_rules(rule_set: &RuleSet) {
    for rule in &rule_set.rules {
        for field in rule
            .fields
            .iter()
            .filter(|field| field.validation == ValidationType::Custom)
        {
            warn!(
                segment = %rule.segment,
                position = %field.position,
                validator = field.custom_validator.as_deref().unwrap_or("<unnamed>"),
                "Custom rule not enforced: no validators registered"
            );
        }
    }
}

async fn read_message(path: &Path, format: Option<FormatArg>) -> anyhow::Result<Message> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let format = format.map(FileFormat::from).or_else(|| {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(FileFormat::from_filename)
    });

    let message = match format {
        Some(format) => edi_parser::parser_for(format).parse(&content),
        None => edi_parser::parse_auto(&content),
    }
    .with_context(|| format!("Failed to parse {}", path.display()))?;

    debug!(path = %path.display(), format = %message.format(), "Loaded message");
    Ok(message.with_source(path.display().to_string()))
}

async fn read_test_data(path: &Path) -> anyhow::Result<BTreeMap<String, Value>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read test data {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let data: BTreeMap<String, Value> = if is_json {
        serde_json::from_str(&raw)?
    } else {
        serde_yaml::from_str(&raw)?
    };
    Ok(data)
}
