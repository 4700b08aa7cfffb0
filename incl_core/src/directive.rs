use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use regex::bytes::Captures;
use regex::bytes::Regex;

use crate::InclError;
use crate::InclResult;

/// The three kinds of directive line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
	/// `%begin-include <path>` opens a managed block in a target file.
	BeginInclude,
	/// `%end-include [hash]` closes a managed block.
	EndInclude,
	/// `%include <path>` is replaced inline inside an included file.
	Include,
}

impl DirectiveKind {
	pub fn keyword(self) -> &'static str {
		match self {
			Self::BeginInclude => "begin-include",
			Self::EndInclude => "end-include",
			Self::Include => "include",
		}
	}

	fn from_keyword(keyword: &[u8]) -> Option<Self> {
		match keyword {
			b"begin-include" => Some(Self::BeginInclude),
			b"end-include" => Some(Self::EndInclude),
			b"include" => Some(Self::Include),
			_ => None,
		}
	}
}

impl fmt::Display for DirectiveKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.keyword())
	}
}

/// A single directive line located in a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
	/// Byte offset of the first byte of the line.
	pub start: usize,
	/// Byte offset just past the line terminator.
	pub end: usize,
	/// Leading spaces and tabs, preserved when the line is rewritten.
	pub indent: String,
	pub kind: DirectiveKind,
	/// The trailing token: a path for `begin-include` and `include`, a hash
	/// for `end-include`.
	pub argument: Option<String>,
	/// `\n`, `\r\n`, or empty when the directive is the last line of a
	/// buffer without a trailing newline.
	pub line_ending: String,
}

impl Directive {
	/// The path argument, for directives that take one.
	pub fn path(&self) -> Option<&str> {
		match self.kind {
			DirectiveKind::BeginInclude | DirectiveKind::Include => self.argument.as_deref(),
			DirectiveKind::EndInclude => None,
		}
	}

	/// The stamped hash trailing an `end-include`.
	pub fn hash(&self) -> Option<&str> {
		match self.kind {
			DirectiveKind::EndInclude => self.argument.as_deref(),
			_ => None,
		}
	}

	/// Short description used in error messages, e.g. `%include lib.js`.
	pub fn describe(&self) -> String {
		match self.path() {
			Some(path) => format!("%{} {path}", self.kind),
			None => format!("%{}", self.kind),
		}
	}
}

/// Locates directive lines written with one specific comment leader.
#[derive(Debug, Clone)]
pub struct DirectiveMatcher {
	leader: String,
	regex: Regex,
}

impl DirectiveMatcher {
	pub fn new(leader: &str) -> InclResult<Self> {
		let pattern = format!(
			r"(?m)^([ \t]*){}%(begin-include|end-include|include)(?:[ \t]+(\S+))?[ \t]*(\r?\n|\z)",
			regex::escape(leader)
		);
		let regex = Regex::new(&pattern).map_err(|e| {
			InclError::InvalidPattern {
				leader: leader.to_string(),
				reason: e.to_string(),
			}
		})?;

		Ok(Self {
			leader: leader.to_string(),
			regex,
		})
	}

	pub fn leader(&self) -> &str {
		&self.leader
	}

	/// Find the first directive line that starts at or after `from`.
	/// Everything between `from` and the returned directive is passthrough
	/// text.
	pub fn find(&self, buffer: &[u8], from: usize) -> Option<Directive> {
		if from > buffer.len() {
			return None;
		}

		let captures = self.regex.captures_at(buffer, from)?;
		directive_from_captures(&captures)
	}
}

fn directive_from_captures(captures: &Captures<'_>) -> Option<Directive> {
	let whole = captures.get(0)?;
	let kind = DirectiveKind::from_keyword(captures.get(2)?.as_bytes())?;
	let text = |index: usize| {
		captures
			.get(index)
			.map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
	};

	Some(Directive {
		start: whole.start(),
		end: whole.end(),
		indent: text(1).unwrap_or_default(),
		kind,
		argument: text(3),
		line_ending: text(4).unwrap_or_default(),
	})
}

/// Compiled matchers keyed by comment leader, so each pattern is built once
/// per run.
#[derive(Debug, Default)]
pub struct MatcherCache {
	matchers: HashMap<String, Rc<DirectiveMatcher>>,
}

impl MatcherCache {
	pub fn get(&mut self, leader: &str) -> InclResult<Rc<DirectiveMatcher>> {
		if let Some(matcher) = self.matchers.get(leader) {
			return Ok(Rc::clone(matcher));
		}

		let matcher = Rc::new(DirectiveMatcher::new(leader)?);
		self.matchers
			.insert(leader.to_string(), Rc::clone(&matcher));
		Ok(matcher)
	}

	pub fn len(&self) -> usize {
		self.matchers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.matchers.is_empty()
	}
}
