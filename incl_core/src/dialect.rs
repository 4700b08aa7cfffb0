use std::collections::BTreeMap;
use std::path::Path;

use crate::config::InclConfig;

/// Leader used when a file's extension is not in the table.
pub const DEFAULT_LEADER: &str = "#";

/// Built-in mapping of file extension to the comment leader that prefixes
/// directive lines in that kind of file.
const BUILTIN_DIALECTS: &[(&str, &str)] = &[
	("js", "//"),
	("xml", "//"),
	("py", "#"),
	("inc", ""),
	("ts", "//"),
	("rs", "//"),
	("go", "//"),
	("c", "//"),
	("h", "//"),
	("sh", "#"),
];

/// Lookup table from file extension to comment leader. Each file uses
/// exactly one leader, chosen by its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectTable {
	leaders: BTreeMap<String, String>,
	default_leader: String,
}

impl Default for DialectTable {
	fn default() -> Self {
		Self::builtin()
	}
}

impl DialectTable {
	pub fn builtin() -> Self {
		let leaders = BUILTIN_DIALECTS
			.iter()
			.map(|(ext, leader)| ((*ext).to_string(), (*leader).to_string()))
			.collect();

		Self {
			leaders,
			default_leader: DEFAULT_LEADER.to_string(),
		}
	}

	/// The built-in table with any `[dialects]` and `default_leader` entries
	/// from the config applied on top.
	pub fn from_config(config: &InclConfig) -> Self {
		let mut table = Self::builtin();
		for (extension, leader) in &config.dialects {
			table.insert(extension, leader);
		}
		if let Some(leader) = &config.default_leader {
			table.default_leader.clone_from(leader);
		}
		table
	}

	pub fn insert(&mut self, extension: &str, leader: &str) {
		let extension = extension.strip_prefix('.').unwrap_or(extension);
		self.leaders
			.insert(extension.to_string(), leader.to_string());
	}

	pub fn default_leader(&self) -> &str {
		&self.default_leader
	}

	/// The comment leader for `path`, based on its extension.
	pub fn leader_for(&self, path: &Path) -> &str {
		path.extension()
			.and_then(|ext| ext.to_str())
			.and_then(|ext| self.leaders.get(ext))
			.map_or(self.default_leader.as_str(), String::as_str)
	}
}
