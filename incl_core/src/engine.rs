use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::ErrorKind;
use crate::InclError;
use crate::InclResult;
use crate::resolver::IncludeContext;
use crate::rewriter::RewriteStatus;
use crate::rewriter::rewrite;

/// Options that apply to every file in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
	/// Regenerate blocks even when their stamped hash shows a manual edit.
	pub force: bool,
	/// Compute the new content without writing anything to disk.
	pub dry_run: bool,
}

/// The bytes of a file before and after rewriting, kept when they differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
	pub original: Vec<u8>,
	pub updated: Vec<u8>,
}

/// What happened to a single input file.
#[derive(Debug)]
pub struct FileOutcome {
	pub path: PathBuf,
	pub result: Result<RewriteStatus, InclError>,
	pub change: Option<FileChange>,
}

impl FileOutcome {
	pub fn is_error(&self) -> bool {
		self.result.is_err()
	}

	pub fn error_kind(&self) -> Option<ErrorKind> {
		self.result.as_ref().err().map(InclError::kind)
	}

	/// The one-line status shown in the summary table.
	pub fn message(&self) -> String {
		match &self.result {
			Ok(status) => status.to_string(),
			Err(e) => e.to_string(),
		}
	}
}

/// Result of running over a list of files.
#[derive(Debug, Default)]
pub struct RunReport {
	/// One entry per input path that is not a directory, in input order.
	pub outcomes: Vec<FileOutcome>,
	/// Number of files written back to disk.
	pub written: usize,
}

impl RunReport {
	/// Number of files that failed. This is the process exit status.
	pub fn error_count(&self) -> usize {
		self.outcomes
			.iter()
			.filter(|outcome| outcome.is_error())
			.count()
	}

	pub fn changed_count(&self) -> usize {
		self.outcomes
			.iter()
			.filter(|outcome| outcome.change.is_some())
			.count()
	}

	/// Render the status table with paths right-aligned to the longest one.
	pub fn summary(&self) -> String {
		if self.outcomes.is_empty() {
			return "No includes were processed.".to_string();
		}

		let paths: Vec<String> = self
			.outcomes
			.iter()
			.map(|outcome| outcome.path.display().to_string())
			.collect();
		let width = paths.iter().map(String::len).max().unwrap_or(0);

		paths
			.iter()
			.zip(&self.outcomes)
			.map(|(path, outcome)| format!("{path:>width$}: {}", outcome.message()))
			.collect::<Vec<_>>()
			.join("\n")
	}
}

/// Rewrite every file in `paths`. Directories are skipped without an
/// outcome. Per-file failures are recorded in the report; only a failure to
/// write an already computed result aborts the run.
pub fn run<P: AsRef<Path>>(
	ctx: &mut IncludeContext,
	paths: &[P],
	options: RunOptions,
) -> InclResult<RunReport> {
	let mut report = RunReport::default();

	for path in paths {
		let path = path.as_ref();
		if path.is_dir() {
			tracing::debug!(path = %path.display(), "skipping directory");
			continue;
		}

		let outcome = process_file(ctx, path, options);
		if let Some(change) = &outcome.change {
			if !options.dry_run {
				write_atomic(path, &change.updated)?;
				tracing::info!(path = %path.display(), "updated includes");
				report.written += 1;
			}
		}
		report.outcomes.push(outcome);
	}

	Ok(report)
}

/// Compute the rewritten content of a single file without touching disk.
pub fn process_file(ctx: &mut IncludeContext, path: &Path, options: RunOptions) -> FileOutcome {
	let original = match std::fs::read(path) {
		Ok(bytes) => bytes,
		Err(e) => {
			return FileOutcome {
				path: path.to_path_buf(),
				result: Err(InclError::Io(e)),
				change: None,
			};
		}
	};

	let leader = ctx.dialects().leader_for(path).to_string();
	let file_dir = match path.parent() {
		Some(dir) if !dir.as_os_str().is_empty() => dir,
		_ => Path::new("."),
	};

	match rewrite(ctx, &original, file_dir, &leader, options.force) {
		Ok(rewritten) => {
			let change = (rewritten.content != original).then(|| {
				FileChange {
					original,
					updated: rewritten.content,
				}
			});
			FileOutcome {
				path: path.to_path_buf(),
				result: Ok(rewritten.status),
				change,
			}
		}
		Err(e) => {
			tracing::debug!(path = %path.display(), kind = %e.kind(), "file left unchanged");
			FileOutcome {
				path: path.to_path_buf(),
				result: Err(e),
				change: None,
			}
		}
	}
}

/// Replace the contents of `path` by writing a sibling temporary file and
/// renaming it into place, so readers never observe a half-written file.
/// The original file's permissions are carried over.
pub fn write_atomic(path: &Path, content: &[u8]) -> InclResult<()> {
	let file_name = path
		.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_default();
	let temp_path = path.with_file_name(format!(
		".{file_name}.incl-tmp-{}-{}",
		std::process::id(),
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map_or(0, |duration| duration.as_nanos())
	));

	if let Err(e) = std::fs::write(&temp_path, content) {
		let _ = std::fs::remove_file(&temp_path);
		return Err(e.into());
	}

	if let Ok(metadata) = std::fs::metadata(path) {
		if let Err(e) = std::fs::set_permissions(&temp_path, metadata.permissions()) {
			let _ = std::fs::remove_file(&temp_path);
			return Err(e.into());
		}
	}

	if let Err(e) = std::fs::rename(&temp_path, path) {
		let _ = std::fs::remove_file(&temp_path);
		return Err(e.into());
	}

	Ok(())
}
