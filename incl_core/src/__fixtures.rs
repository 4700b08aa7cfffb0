use std::path::Path;
use std::path::PathBuf;

use crate::AnyResult;
use crate::Directive;
use crate::DirectiveKind;

pub const LIB_JS: &str = "function lib() {\n\treturn 1;\n}\n";

/// Write each `(relative path, content)` pair below `root`, creating parent
/// directories as needed.
pub fn write_files(root: &Path, files: &[(&str, &str)]) -> AnyResult<()> {
	for (relative, content) in files {
		let path = root.join(relative);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, content)?;
	}

	Ok(())
}

pub fn read_file(root: &Path, relative: &str) -> AnyResult<String> {
	Ok(std::fs::read_to_string(root.join(relative))?)
}

pub fn paths(root: &Path, relative: &[&str]) -> Vec<PathBuf> {
	relative.iter().map(|name| root.join(name)).collect()
}

pub fn directive(kind: DirectiveKind, indent: &str, argument: Option<&str>) -> (DirectiveKind, String, Option<String>) {
	(kind, indent.to_string(), argument.map(ToString::to_string))
}

pub fn summarize(directive: &Directive) -> (DirectiveKind, String, Option<String>) {
	(
		directive.kind,
		directive.indent.clone(),
		directive.argument.clone(),
	)
}
