use std::fmt;
use std::path::Path;

use crate::DirectiveKind;
use crate::InclError;
use crate::InclResult;
use crate::hash::content_hash;
use crate::resolver::IncludeContext;

/// Outcome of rewriting a single file that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteStatus {
	/// The file has no directive lines at all.
	NoIncludes,
	/// Every block was regenerated and the bytes came out identical.
	Unchanged(usize),
	/// At least one block changed.
	Updated(usize),
}

impl RewriteStatus {
	/// Number of include blocks processed.
	pub fn includes(self) -> usize {
		match self {
			Self::NoIncludes => 0,
			Self::Unchanged(count) | Self::Updated(count) => count,
		}
	}

	pub fn is_changed(self) -> bool {
		matches!(self, Self::Updated(_))
	}
}

impl fmt::Display for RewriteStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let (label, count) = match self {
			Self::NoIncludes => return f.write_str("No includes found"),
			Self::Unchanged(count) => ("Unchanged", *count),
			Self::Updated(count) => ("Updated", *count),
		};
		let plural = if count == 1 { "" } else { "s" };
		write!(f, "{label} ({count} include{plural})")
	}
}

/// The rewritten content of a file together with its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
	pub content: Vec<u8>,
	pub status: RewriteStatus,
}

/// Regenerate every `begin-include` / `end-include` block in `content`.
///
/// Paths are resolved relative to `file_dir`, and directives are recognized
/// by `leader`. Any structural problem, stale hash or unresolvable include
/// fails the whole file; no partially rewritten content is ever returned.
/// Unless `force` is set, a block whose current bytes no longer match the
/// hash stamped on its `end-include` line is treated as hand-edited and
/// left alone.
pub fn rewrite(
	ctx: &mut IncludeContext,
	content: &[u8],
	file_dir: &Path,
	leader: &str,
	force: bool,
) -> InclResult<Rewrite> {
	let matcher = ctx.matcher(leader)?;

	let Some(mut begin) = matcher.find(content, 0) else {
		return Ok(Rewrite {
			content: content.to_vec(),
			status: RewriteStatus::NoIncludes,
		});
	};

	let mut output = Vec::with_capacity(content.len());
	let mut pos = 0;
	let mut includes = 0;

	loop {
		output.extend_from_slice(&content[pos..begin.end]);

		if begin.kind != DirectiveKind::BeginInclude {
			return Err(InclError::UnexpectedDirective {
				directive: begin.describe(),
			});
		}

		let Some(path) = begin.path() else {
			return Err(InclError::MissingPath {
				directive: format!("{leader}%begin-include"),
			});
		};

		let Some(end) = matcher.find(content, begin.end) else {
			return Err(InclError::UnterminatedBlock {
				path: path.to_string(),
			});
		};

		if end.kind != DirectiveKind::EndInclude {
			return Err(InclError::NestedDirective {
				directive: format!("%{}", end.kind),
				path: path.to_string(),
			});
		}

		if !force {
			if let Some(stamp) = end.hash() {
				let current = content_hash(&content[begin.end..end.start]);
				if !stamp.eq_ignore_ascii_case(&current) {
					tracing::warn!(include = path, stamp, %current, "include block was edited by hand");
					return Err(InclError::DriftDetected {
						path: path.to_string(),
					});
				}
			}
		}

		let text = ctx
			.resolve(&file_dir.join(path))
			.map_err(|e| {
				InclError::IncludeFailed {
					path: path.to_string(),
					cause: Box::new(e),
				}
			})?;

		let line_ending = if end.line_ending.is_empty() {
			"\n"
		} else {
			end.line_ending.as_str()
		};

		// The closing directive must start its own line or it would not be
		// found on the next run.
		let mut block = text.to_vec();
		if block.last().is_some_and(|byte| *byte != b'\n') {
			block.extend_from_slice(line_ending.as_bytes());
		}

		let hash = content_hash(&block);
		tracing::debug!(include = path, %hash, bytes = block.len(), "rewrote include block");

		output.extend_from_slice(&block);
		output.extend_from_slice(
			format!("{}{leader}%end-include {hash}{line_ending}", end.indent).as_bytes(),
		);
		pos = end.end;
		includes += 1;

		match matcher.find(content, pos) {
			Some(next) => begin = next,
			None => break,
		}
	}

	output.extend_from_slice(&content[pos..]);

	let status = if output == content {
		RewriteStatus::Unchanged(includes)
	} else {
		RewriteStatus::Updated(includes)
	};

	Ok(Rewrite {
		content: output,
		status,
	})
}
