//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Pack | Pack lifecycle | `pack new`, `pack show`, `pack snapshot` |
//! | Group | Characters inside a pack | `group add`, `group rename` |
//! | Item | Faces inside a group | `item add`, `item remove` |
//! | Query | Lookup and ordering | `get`, `order` |
//! | Merge | Combining packs | `merge` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! The default can be changed with `default_format` in the global config.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for progress messages and debug logs:
//! ```bash
//! facepack --verbose order faces
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod group;
mod item;
mod merge;
mod output;
mod pack;
mod query;

pub use app::{run, Cli, Commands};
pub use output::{init_logging, Output, OutputFormat};
