use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::InclError;
use crate::InclResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["incl.toml", ".incl.toml", ".config/incl.toml"];

/// Default limit on how deeply `%include` directives may nest.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Optional configuration loaded from `incl.toml`.
///
/// ```toml
/// default_leader = "#"
/// max_depth = 16
///
/// [dialects]
/// ts = "//"
/// sql = "--"
/// ```
///
/// Entries in `[dialects]` are merged over the built-in extension table.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InclConfig {
	/// Map of file extension (with or without the leading dot) to the comment
	/// leader that prefixes directives in files with that extension.
	#[serde(default)]
	pub dialects: BTreeMap<String, String>,
	/// Leader used for extensions missing from the dialect table.
	#[serde(default)]
	pub default_leader: Option<String>,
	/// Maximum include nesting depth. Defaults to [`DEFAULT_MAX_DEPTH`].
	#[serde(default)]
	pub max_depth: Option<usize>,
}

impl InclConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> InclResult<Option<InclConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_from(&config_path).map(Some)
	}

	/// Load the config from an explicit path.
	pub fn load_from(path: &Path) -> InclResult<InclConfig> {
		let content = std::fs::read_to_string(path)?;
		Self::parse(&content)
	}

	pub fn parse(content: &str) -> InclResult<InclConfig> {
		toml::from_str(content).map_err(|e| InclError::ConfigParse(e.to_string()))
	}

	pub fn max_depth(&self) -> usize {
		self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
	}
}
