//! `marc-stats` command line tool.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use marc_stats::config::{
    BsrConfig, CoverageConfig, LabelConfig, OutputFormat, TagUseConfig, DEFAULT_LCSH_SKOS,
    DEFAULT_ORDER_LIST,
};
use marc_stats::formats::InputFormat;
use marc_stats::{MarcError, TagPolicy};

/// MARC tag usage and coverage statistics
#[derive(Parser, Debug)]
#[command(name = "marc-stats")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log progress at debug level (-vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputArg::Text, global = true)]
    output: OutputArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count how many records use each field tag
    TagUse(TagUseArgs),

    /// Measure how far a ranked tag list covers the records
    Coverage(CoverageArgs),

    /// Extract SKOS concepts and labels from an N-Triples dump
    LcshLabels(LabelArgs),

    /// List tags mentioned in BSR documentation text
    BsrTags(BsrArgs),
}

#[derive(Parser, Debug)]
struct TagUseArgs {
    /// MARC files or directories to read
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Record format of the inputs
    #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
    format: FormatArg,

    /// How repeated tags within a record are counted
    #[arg(long, value_enum, default_value_t = PolicyArg::Distinct)]
    policy: PolicyArg,
}

#[derive(Parser, Debug)]
struct CoverageArgs {
    /// MARC files or directories to read
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Record format of the inputs
    #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
    format: FormatArg,

    /// Ranked list of tags, one per line
    #[arg(long, default_value = DEFAULT_ORDER_LIST)]
    order_list: PathBuf,
}

#[derive(Parser, Debug)]
struct LabelArgs {
    /// SKOS description in N-Triples format, optionally gzipped
    #[arg(long, default_value = DEFAULT_LCSH_SKOS)]
    lcsh_skos: PathBuf,

    /// Stop after this many statements pass the filter
    #[arg(long)]
    stop_after: Option<usize>,

    /// Also print each concept URI with its preferred label
    #[arg(long)]
    list: bool,
}

#[derive(Parser, Debug)]
struct BsrArgs {
    /// Text extracted from the BSR document; standard input if omitted
    input: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    /// Detect from each file name
    Auto,
    /// MARCXML
    Marcxml,
    /// ISO 2709 binary MARC
    Iso2709,
}

impl FormatArg {
    fn input_format(self) -> Option<InputFormat> {
        match self {
            FormatArg::Auto => None,
            FormatArg::Marcxml => Some(InputFormat::MarcXml),
            FormatArg::Iso2709 => Some(InputFormat::Iso2709),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    /// Each tag once per record
    Distinct,
    /// Each run of adjacent repeated tags once
    CollapseRuns,
}

impl From<PolicyArg> for TagPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Distinct => TagPolicy::Distinct,
            PolicyArg::CollapseRuns => TagPolicy::CollapseRuns,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputArg {
    /// Plain text report
    Text,
    /// JSON document
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => OutputFormat::Text,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn emit<T: std::fmt::Display + Serialize>(output: OutputFormat, value: &T) -> Result<()> {
    let text = output.render(value).context("Failed to serialize report")?;
    io::stdout()
        .lock()
        .write_all(text.as_bytes())
        .context("Failed to write report")?;
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = OutputFormat::from(cli.output);

    match cli.command {
        Commands::TagUse(args) => {
            let config = TagUseConfig {
                inputs: args.inputs,
                format: args.format.input_format(),
                policy: args.policy.into(),
            };
            emit(output, &config.run()?)
        },
        Commands::Coverage(args) => {
            let config = CoverageConfig {
                inputs: args.inputs,
                format: args.format.input_format(),
                order_list: args.order_list,
            };
            emit(output, &config.run()?)
        },
        Commands::LcshLabels(args) => {
            let config = LabelConfig {
                skos: args.lcsh_skos,
                stop_after: args.stop_after,
            };
            let extraction = config.run()?;
            emit(output, &extraction)?;
            if args.list && output == OutputFormat::Text {
                let mut out = io::stdout().lock();
                for concept in extraction.index.concepts() {
                    writeln!(out, "{}\t{}", concept.uri, concept.pref_label().unwrap_or(""))
                        .context("Failed to write concept list")?;
                }
            }
            Ok(())
        },
        Commands::BsrTags(args) => emit(output, &BsrConfig { input: args.input }.run()?),
    }
}

/// Joins the context chain down to the first library error, whose message
/// already includes its causes.
fn describe(error: &anyhow::Error) -> String {
    let mut parts = Vec::new();
    for cause in error.chain() {
        parts.push(cause.to_string());
        if cause.is::<MarcError>() {
            break;
        }
    }
    parts.join(": ")
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", describe(&e));
            ExitCode::FAILURE
        },
    }
}
