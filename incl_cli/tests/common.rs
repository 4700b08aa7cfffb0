use assert_cmd::Command;

pub const LIB_JS: &str = "function lib() {\n\treturn 1;\n}\n";

pub fn incl_cmd() -> Command {
	let mut cmd = Command::cargo_bin("update-includes")
		.unwrap_or_else(|e| panic!("update-includes binary not built: {e}"));
	cmd.env("NO_COLOR", "1").env_remove("INCL_LOG");
	cmd
}
