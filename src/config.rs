//! Session configuration.
//!
//! A session needs three knobs: where (if anywhere) the structured report goes, whether the text report is
//! verbose, and how repeated runs accumulate in the report file. They can be set in code, read from the
//! environment ([`SessionConfig::from_env`]), or parsed from a harness binary's own command line by
//! flattening [`ReportArgs`] into its clap parser.

use std::env;
use std::path::PathBuf;

use clap::Args;

use crate::report::SinkMode;

pub const OUTPUT_FILE_VAR: &str = "GRIEVANCE_OUTPUT_FILE";
pub const VERBOSE_VAR: &str = "GRIEVANCE_VERBOSE";
pub const SINK_MODE_VAR: &str = "GRIEVANCE_SINK_MODE";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Report file; `None` disables persistence.
    pub output: Option<PathBuf>,
    pub verbose: bool,
    pub sink_mode: SinkMode,
}

impl SessionConfig {
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_sink_mode(mut self, mode: SinkMode) -> Self {
        self.sink_mode = mode;
        self
    }

    /// Read `GRIEVANCE_OUTPUT_FILE`, `GRIEVANCE_VERBOSE` and `GRIEVANCE_SINK_MODE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. An unknown sink mode falls back to the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let sink_mode = match get(SINK_MODE_VAR) {
            Some(raw) => SinkMode::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "unknown {SINK_MODE_VAR}, using the default");
                SinkMode::default()
            }),
            None => SinkMode::default(),
        };

        Self {
            output: get(OUTPUT_FILE_VAR).map(PathBuf::from),
            verbose: get(VERBOSE_VAR).is_some_and(|v| is_truthy(&v)),
            sink_mode,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Command-line flags for harness binaries.
#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Write a detailed disappointment report to a file
    #[arg(long = "grievance-output-file", value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Print every dimension of the report, not just the total
    #[arg(long = "grievance-verbose")]
    pub verbose: bool,

    /// How repeated runs accumulate in the report file
    #[arg(long = "grievance-sink-mode", value_enum, default_value_t = SinkMode::Array)]
    pub sink_mode: SinkMode,
}

impl From<ReportArgs> for SessionConfig {
    fn from(args: ReportArgs) -> Self {
        SessionConfig {
            output: args.output_file,
            verbose: args.verbose,
            sink_mode: args.sink_mode,
        }
    }
}
