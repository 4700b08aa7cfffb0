use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Coarse classification of an [`InclError`], used for program logic. The
/// error's `Display` output is only meant for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// A directive that requires a path argument was written without one.
	MissingPath,
	/// Directives do not pair up as `begin-include` / `end-include`, or an
	/// included file contains block directives.
	StructuralMismatch,
	/// The stamped hash no longer matches the block content on disk.
	DriftDetected,
	/// An included file could not be read, or resolving it would never end.
	ResolutionFailure,
	Io,
	Config,
}

impl ErrorKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::MissingPath => "missing_path",
			Self::StructuralMismatch => "structural_mismatch",
			Self::DriftDetected => "drift_detected",
			Self::ResolutionFailure => "resolution_failure",
			Self::Io => "io",
			Self::Config => "config",
		}
	}
}

impl std::fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum InclError {
	#[error(transparent)]
	#[diagnostic(code(incl::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(incl::config_parse),
		help("check that incl.toml is valid TOML with `default_leader`, `max_depth` and a [dialects] table")
	)]
	ConfigParse(String),

	#[error("invalid directive pattern for comment leader `{leader}`: {reason}")]
	#[diagnostic(code(incl::invalid_pattern))]
	InvalidPattern { leader: String, reason: String },

	#[error("path missing on `{directive}`")]
	#[diagnostic(
		code(incl::missing_path),
		help("directives of this kind need a path relative to the containing file")
	)]
	MissingPath { directive: String },

	#[error("unexpected `{directive}`")]
	#[diagnostic(
		code(incl::unexpected_directive),
		help("include blocks must start with `%begin-include <path>`")
	)]
	UnexpectedDirective { directive: String },

	#[error("missing end-include for `{path}`")]
	#[diagnostic(
		code(incl::unterminated_block),
		help("close the block with a `%end-include` line")
	)]
	UnterminatedBlock { path: String },

	#[error("unexpected `{directive}` including `{path}`")]
	#[diagnostic(
		code(incl::nested_directive),
		help("the only directive allowed after `%begin-include` is `%end-include`")
	)]
	NestedDirective { directive: String, path: String },

	#[error("`{directive}` is illegal in included file {}", .file.display())]
	#[diagnostic(
		code(incl::illegal_directive),
		help("files that are included may only use the flat `%include <path>` form")
	)]
	IllegalDirective { directive: String, file: PathBuf },

	#[error("include `{path}` has been edited; bypassing update. Use --force to override")]
	#[diagnostic(
		code(incl::drift_detected),
		help("revert the manual edit, move it into the included file, or rerun with `--force`")
	)]
	DriftDetected { path: String },

	#[error("cannot read included file {}: {reason}", .path.display())]
	#[diagnostic(code(incl::missing_include))]
	MissingInclude { path: PathBuf, reason: String },

	#[error("include cycle detected: {chain}")]
	#[diagnostic(
		code(incl::include_cycle),
		help("a file may not include itself, directly or through other files")
	)]
	IncludeCycle { chain: String },

	#[error("include depth limit of {limit} exceeded at {}", .path.display())]
	#[diagnostic(
		code(incl::depth_exceeded),
		help("raise `max_depth` in incl.toml if the nesting is intentional")
	)]
	DepthExceeded { path: PathBuf, limit: usize },

	#[error("error including `{path}`: {cause}")]
	#[diagnostic(code(incl::include_failed))]
	IncludeFailed { path: String, cause: Box<InclError> },
}

impl InclError {
	/// The classification used by callers to decide how to react.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Io(_) => ErrorKind::Io,
			Self::ConfigParse(_) | Self::InvalidPattern { .. } => ErrorKind::Config,
			Self::MissingPath { .. } => ErrorKind::MissingPath,
			Self::UnexpectedDirective { .. }
			| Self::UnterminatedBlock { .. }
			| Self::NestedDirective { .. }
			| Self::IllegalDirective { .. } => ErrorKind::StructuralMismatch,
			Self::DriftDetected { .. } => ErrorKind::DriftDetected,
			Self::MissingInclude { .. } | Self::IncludeCycle { .. } | Self::DepthExceeded { .. } => {
				ErrorKind::ResolutionFailure
			}
			Self::IncludeFailed { cause, .. } => cause.kind(),
		}
	}
}

pub type InclResult<T> = Result<T, InclError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
