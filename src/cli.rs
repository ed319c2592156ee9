use clap::Parser;
use std::path::PathBuf;

use difftree::formatter::OutputFormat;
use difftree::{ArrayOptimization, DiffOptions, DiffTreeError, LogFormat, StringComparison};

/// Command-line arguments for difftree
#[derive(Parser, Debug)]
#[command(name = "difftree", version)]
#[command(about = "Build a structural difference tree between two JSON documents")]
pub struct Args {
    /// Old JSON file or inline JSON string
    pub old: Option<String>,

    /// New JSON file or inline JSON string
    pub new: Option<String>,

    /// JSON file holding a full request: {"oldData", "newData", "ignoreFields", "options"}
    #[arg(long, conflicts_with_all = ["old", "new"])]
    pub request: Option<PathBuf>,

    /// Path or glob to ignore, e.g. `user.id` or `items[*].ts` (repeatable)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// JSON file containing paths to ignore (can be specified multiple times)
    #[arg(long)]
    pub ignore_json: Vec<PathBuf>,

    /// JSON file with comparison options; flags given here take precedence
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// How strings are compared
    #[arg(long, value_enum)]
    pub string_comparison: Option<StringComparison>,

    /// Compare numbers rounded to this many decimal places
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=15))]
    pub number_precision: Option<u32>,

    /// Truncation limit for displayed values
    #[arg(long)]
    pub max_string_length: Option<usize>,

    /// Whether large arrays are sampled or compared in full
    #[arg(long, value_enum)]
    pub array_optimization: Option<ArrayOptimization>,

    /// Container nesting limit
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Strip values from unchanged nodes
    #[arg(long)]
    pub omit_unchanged: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Print output on a single line
    #[arg(long)]
    pub compact: bool,

    /// JSON object mapping field keys to display labels (html format)
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// Print a detailed statistics report to stderr
    #[arg(long)]
    pub report: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Validate command-line arguments
    pub fn validate(&self) -> Result<(), DiffTreeError> {
        if self.request.is_none() && (self.old.is_none() || self.new.is_none()) {
            return Err(DiffTreeError::InvalidArgs {
                message: "OLD and NEW inputs are required unless --request is given".to_string(),
            });
        }

        // Validate input files exist
        let files = self
            .ignore_json
            .iter()
            .chain(&self.request)
            .chain(&self.options)
            .chain(&self.labels);
        for path in files {
            if !path.exists() {
                return Err(DiffTreeError::FileRead {
                    path: path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "File not found"),
                });
            }
        }

        Ok(())
    }

    /// Options set directly by flags
    pub fn flag_options(&self) -> DiffOptions {
        DiffOptions {
            string_comparison: self.string_comparison,
            number_precision: self.number_precision,
            max_string_length: self.max_string_length,
            array_optimization: self.array_optimization,
            max_depth: self.max_depth,
            include_unchanged: self.omit_unchanged.then_some(false),
            ..Default::default()
        }
    }
}
