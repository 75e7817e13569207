//! Output formatting for CLI commands

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::storage;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Installs the stderr log subscriber
///
/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("facepack_cli=debug,warn")
        } else {
            EnvFilter::new("warn")
        }
    });

    // A second install (tests calling `run` twice) is not an error worth reporting
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints a warning (text only; JSON callers put it in the payload)
    pub fn warn(&self, message: &str) {
        if self.format == OutputFormat::Text {
            eprintln!("Warning: {}", message);
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                // Callers normally print text themselves; this is the fallback
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}
