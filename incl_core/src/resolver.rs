use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use crate::DirectiveKind;
use crate::DirectiveMatcher;
use crate::InclError;
use crate::InclResult;
use crate::MatcherCache;
use crate::config::InclConfig;
use crate::dialect::DialectTable;

/// State shared by every file processed in one run: the dialect table, the
/// compiled directive matchers, and the flattened content of each included
/// file keyed by its located path (see [`IncludeContext::resolve`]).
///
/// Included files are assumed not to change while a run is in progress, so
/// cached content is never invalidated.
#[derive(Debug)]
pub struct IncludeContext {
	dialects: DialectTable,
	matchers: MatcherCache,
	resolved: HashMap<PathBuf, Rc<[u8]>>,
	/// Located paths currently being flattened, outermost first.
	stack: Vec<PathBuf>,
	max_depth: usize,
}

impl Default for IncludeContext {
	fn default() -> Self {
		Self::new(DialectTable::builtin(), crate::DEFAULT_MAX_DEPTH)
	}
}

impl IncludeContext {
	pub fn new(dialects: DialectTable, max_depth: usize) -> Self {
		Self {
			dialects,
			matchers: MatcherCache::default(),
			resolved: HashMap::new(),
			stack: Vec::new(),
			max_depth,
		}
	}

	pub fn from_config(config: &InclConfig) -> Self {
		Self::new(DialectTable::from_config(config), config.max_depth())
	}

	pub fn dialects(&self) -> &DialectTable {
		&self.dialects
	}

	/// Number of included files flattened so far in this run.
	pub fn resolved_count(&self) -> usize {
		self.resolved.len()
	}

	/// The compiled matcher for `leader`, built on first use.
	pub fn matcher(&mut self, leader: &str) -> InclResult<Rc<DirectiveMatcher>> {
		self.matchers.get(leader)
	}

	/// The compiled matcher for the dialect of `path`.
	pub fn matcher_for_path(&mut self, path: &Path) -> InclResult<Rc<DirectiveMatcher>> {
		let leader = self.dialects.leader_for(path).to_string();
		self.matchers.get(&leader)
	}

	/// Return the fully flattened content of the file at `path`: every
	/// `%include <path>` line in it is replaced by the flattened content of
	/// its target, recursively.
	///
	/// A file is identified by its canonical directory plus the name it was
	/// referenced by. When that name is a symlink, its extension picks the
	/// dialect and nested includes resolve against the directory holding the
	/// link, not the directory of its target.
	pub fn resolve(&mut self, path: &Path) -> InclResult<Rc<[u8]>> {
		let located = locate(path)?;

		if let Some(text) = self.resolved.get(&located) {
			tracing::debug!(path = %located.display(), "include cache hit");
			return Ok(Rc::clone(text));
		}

		if let Some(index) = self.stack.iter().position(|entry| *entry == located) {
			let chain = self.stack[index..]
				.iter()
				.chain(std::iter::once(&located))
				.map(|entry| entry.display().to_string())
				.collect::<Vec<_>>()
				.join(" -> ");
			return Err(InclError::IncludeCycle { chain });
		}

		if self.stack.len() >= self.max_depth {
			return Err(InclError::DepthExceeded {
				path: located,
				limit: self.max_depth,
			});
		}

		tracing::debug!(path = %located.display(), depth = self.stack.len(), "resolving include");
		self.stack.push(located.clone());
		let flattened = self.flatten(&located);
		self.stack.pop();

		let text: Rc<[u8]> = Rc::from(flattened?);
		self.resolved.insert(located, Rc::clone(&text));
		Ok(text)
	}

	fn flatten(&mut self, path: &Path) -> InclResult<Vec<u8>> {
		let data = std::fs::read(path).map_err(|e| {
			InclError::MissingInclude {
				path: path.to_path_buf(),
				reason: e.to_string(),
			}
		})?;
		let matcher = self.matcher_for_path(path)?;
		let dir = path.parent().unwrap_or_else(|| Path::new("."));

		let mut result = Vec::with_capacity(data.len());
		let mut pos = 0;

		while let Some(directive) = matcher.find(&data, pos) {
			result.extend_from_slice(&data[pos..directive.start]);
			pos = directive.end;

			if directive.kind != DirectiveKind::Include {
				return Err(InclError::IllegalDirective {
					directive: format!("{}%{}", matcher.leader(), directive.kind),
					file: path.to_path_buf(),
				});
			}

			let Some(target) = directive.path() else {
				return Err(InclError::MissingPath {
					directive: format!("{}%include", matcher.leader()),
				});
			};

			let text = self.resolve(&dir.join(target))?;
			result.extend_from_slice(&text);
		}

		result.extend_from_slice(&data[pos..]);
		Ok(result)
	}
}

/// Canonicalize the directory part of `path` and keep its file name as
/// written.
fn locate(path: &Path) -> InclResult<PathBuf> {
	let missing = |reason: String| {
		InclError::MissingInclude {
			path: path.to_path_buf(),
			reason,
		}
	};

	let Some(name) = path.file_name() else {
		return Err(missing("not a file".to_string()));
	};
	let parent = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};
	let dir = std::fs::canonicalize(parent).map_err(|e| missing(e.to_string()))?;

	Ok(dir.join(name))
}
