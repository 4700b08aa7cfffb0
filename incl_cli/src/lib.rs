use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	name = "update-includes",
	author,
	version,
	about = "Update all include blocks in the specified source files.",
	long_about = "Update all include blocks in the specified source files.\n\nAn include block starts \
	              out looking like:\n\n    //%begin-include filepath\n    //%end-include\n\nwhere \
	              filepath is relative to the file containing the block. After the first run the \
	              content of filepath sits between the two lines and the closing line carries the \
	              SHA-1 of that content:\n\n    //%begin-include filepath\n    ...\n    \
	              //%end-include <sha1>\n\nLater runs replace the block with the current version of \
	              filepath as long as the block has not been edited by hand. Use --force to \
	              overwrite hand edits.\n\nFiles that are included may themselves contain flat \
	              `%include filepath` lines, which are expanded recursively."
)]
#[allow(clippy::struct_excessive_bools)]
pub struct InclCli {
	/// Source files to update. Directories are skipped.
	#[arg(required = true, value_name = "FILES")]
	pub files: Vec<PathBuf>,

	/// Complete the update despite any independent edits to include blocks.
	#[arg(long, short, default_value_t = false)]
	pub force: bool,

	/// Compute updates and show a diff without writing any files.
	#[arg(long, default_value_t = false)]
	pub dry_run: bool,

	/// Output format for the summary. Use `text` for the human-readable table
	/// or `json` for programmatic consumption.
	#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,

	/// Path to a config file. Defaults to the first of `incl.toml`,
	/// `.incl.toml` or `.config/incl.toml` in the current directory.
	#[arg(long)]
	pub config: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// One right-aligned `path: status` line per file.
	Text,
	/// A JSON array with one object per file, including the error kind for
	/// failed files.
	Json,
}

/// Exit status used when the run itself fails rather than an individual
/// file, such as an unreadable config or a failed write.
pub const FATAL_EXIT_CODE: i32 = 255;

/// Exit status for a run that completed with `error_count` failed files.
/// Counts saturate one below [`FATAL_EXIT_CODE`] so the two never overlap.
pub fn exit_code(error_count: usize) -> i32 {
	i32::try_from(error_count)
		.unwrap_or(i32::MAX)
		.min(FATAL_EXIT_CODE - 1)
}
