use incl_core::AnyEmptyResult;
use predicates::prelude::*;

mod common;

use common::LIB_JS;
use common::incl_cmd;

#[test]
fn update_fills_empty_block() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("lib.js"), LIB_JS)?;
	std::fs::write(
		tmp.path().join("app.js"),
		"// app\n//%begin-include lib.js\n//%end-include\nlib();\n",
	)?;

	incl_cmd()
		.current_dir(tmp.path())
		.arg("app.js")
		.assert()
		.success()
		.stdout(predicate::str::contains("app.js: Updated (1 include)"));

	let content = std::fs::read_to_string(tmp.path().join("app.js"))?;
	assert!(content.starts_with("// app\n//%begin-include lib.js\nfunction lib() {\n"));
	assert!(content.ends_with("lib();\n"));

	let end_line = content
		.lines()
		.find(|line| line.starts_with("//%end-include"))
		.unwrap_or_default();
	let hash = end_line.trim_start_matches("//%end-include ");
	assert_eq!(hash.len(), 40);
	assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

	Ok(())
}

#[test]
fn update_second_run_is_unchanged() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("lib.js"), LIB_JS)?;
	std::fs::write(
		tmp.path().join("app.js"),
		"//%begin-include lib.js\n//%end-include\n",
	)?;

	incl_cmd()
		.current_dir(tmp.path())
		.arg("app.js")
		.assert()
		.success();
	let first = std::fs::read_to_string(tmp.path().join("app.js"))?;

	incl_cmd()
		.current_dir(tmp.path())
		.arg("app.js")
		.assert()
		.success()
		.stdout(predicate::str::contains("app.js: Unchanged (1 include)"));

	assert_eq!(std::fs::read_to_string(tmp.path().join("app.js"))?, first);

	Ok(())
}

#[test]
fn update_refuses_edited_block_until_forced() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("lib.js"), LIB_JS)?;
	std::fs::write(
		tmp.path().join("app.js"),
		"//%begin-include lib.js\n//%end-include\n",
	)?;

	incl_cmd()
		.current_dir(tmp.path())
		.arg("app.js")
		.assert()
		.success();
	let generated = std::fs::read_to_string(tmp.path().join("app.js"))?;

	let edited = generated.replace("return 1;", "return 42;");
	std::fs::write(tmp.path().join("app.js"), &edited)?;

	incl_cmd()
		.current_dir(tmp.path())
		.arg("app.js")
		.assert()
		.code(1)
		.stdout(predicate::str::contains(
			"app.js: include `lib.js` has been edited; bypassing update. Use --force to override",
		));
	assert_eq!(std::fs::read_to_string(tmp.path().join("app.js"))?, edited);

	incl_cmd()
		.current_dir(tmp.path())
		.arg("--force")
		.arg("app.js")
		.assert()
		.success()
		.stdout(predicate::str::contains("app.js: Updated (1 include)"));
	assert_eq!(std::fs::read_to_string(tmp.path().join("app.js"))?, generated);

	Ok(())
}

#[test]
fn update_exit_code_counts_failed_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("lib.js"), LIB_JS)?;
	std::fs::write(tmp.path().join("stray.js"), "//%end-include\n")?;
	std::fs::write(
		tmp.path().join("open.js"),
		"//%begin-include lib.js\n//%begin-include lib.js\n//%end-include\n",
	)?;
	std::fs::write(
		tmp.path().join("good.js"),
		"//%begin-include lib.js\n//%end-include\n",
	)?;

	incl_cmd()
		.current_dir(tmp.path())
		.args(["stray.js", "open.js", "good.js"])
		.assert()
		.code(2)
		.stdout(predicate::str::contains("stray.js: unexpected `%end-include`"))
		.stdout(predicate::str::contains(
			" open.js: unexpected `%begin-include` including `lib.js`",
		))
		.stdout(predicate::str::contains(" good.js: Updated (1 include)"));

	Ok(())
}

#[test]
fn update_reports_files_without_includes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let content = "print('hello')\n";
	std::fs::write(tmp.path().join("plain.py"), content)?;
	std::fs::create_dir(tmp.path().join("nested"))?;

	incl_cmd()
		.current_dir(tmp.path())
		.args(["nested", "plain.py"])
		.assert()
		.success()
		.stdout(predicate::str::contains("plain.py: No includes found"))
		.stdout(predicate::str::contains("nested").not());

	assert_eq!(std::fs::read_to_string(tmp.path().join("plain.py"))?, content);

	Ok(())
}

#[test]
fn update_with_only_directories_processes_nothing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir(tmp.path().join("nested"))?;

	incl_cmd()
		.current_dir(tmp.path())
		.arg("nested")
		.assert()
		.success()
		.stdout(predicate::str::contains("No includes were processed."));

	Ok(())
}

#[test]
fn update_flattens_nested_includes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir(tmp.path().join("parts"))?;
	std::fs::write(
		tmp.path().join("parts/outer.inc"),
		"outer start\n%include inner.inc\nouter end\n",
	)?;
	std::fs::write(tmp.path().join("parts/inner.inc"), "inner\n")?;
	std::fs::write(
		tmp.path().join("build.py"),
		"    #%begin-include parts/outer.inc\n    #%end-include\n",
	)?;

	incl_cmd()
		.current_dir(tmp.path())
		.arg("build.py")
		.assert()
		.success();

	let content = std::fs::read_to_string(tmp.path().join("build.py"))?;
	assert!(content.contains("outer start\ninner\nouter end\n    #%end-include "));
	assert!(!content.contains("%include inner.inc"));

	Ok(())
}

#[test]
fn update_reports_include_cycle() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("a.inc"), "%include b.inc\n")?;
	std::fs::write(tmp.path().join("b.inc"), "%include a.inc\n")?;
	let content = "//%begin-include a.inc\n//%end-include\n";
	std::fs::write(tmp.path().join("app.js"), content)?;

	incl_cmd()
		.current_dir(tmp.path())
		.arg("app.js")
		.assert()
		.code(1)
		.stdout(predicate::str::contains("include cycle detected"));

	assert_eq!(std::fs::read_to_string(tmp.path().join("app.js"))?, content);

	Ok(())
}

#[test]
fn update_dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("lib.js"), LIB_JS)?;
	let content = "//%begin-include lib.js\n//%end-include\n";
	std::fs::write(tmp.path().join("app.js"), content)?;

	incl_cmd()
		.current_dir(tmp.path())
		.arg("--dry-run")
		.arg("app.js")
		.assert()
		.success()
		.stdout(predicate::str::contains("Would update app.js:"))
		.stdout(predicate::str::contains("+function lib() {"))
		.stdout(predicate::str::contains("nothing was written"));

	assert_eq!(std::fs::read_to_string(tmp.path().join("app.js"))?, content);

	Ok(())
}

#[test]
fn update_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("lib.js"), LIB_JS)?;
	std::fs::write(
		tmp.path().join("app.js"),
		"//%begin-include lib.js\n//%end-include\n",
	)?;
	std::fs::write(
		tmp.path().join("broken.js"),
		"//%begin-include missing.js\n//%end-include\n",
	)?;

	let output = incl_cmd()
		.current_dir(tmp.path())
		.args(["--format", "json", "app.js", "broken.js"])
		.output()?;
	assert_eq!(output.status.code(), Some(1));

	let entries: serde_json::Value = serde_json::from_slice(&output.stdout)?;
	let entries = entries.as_array().cloned().unwrap_or_default();
	assert_eq!(entries.len(), 2);

	assert_eq!(entries[0]["file"], "app.js");
	assert_eq!(entries[0]["status"], "updated");
	assert_eq!(entries[0]["includes"], 1);
	assert_eq!(entries[0]["changed"], true);
	assert!(entries[0]["error"].is_null());

	assert_eq!(entries[1]["file"], "broken.js");
	assert_eq!(entries[1]["status"], "error");
	assert_eq!(entries[1]["kind"], "resolution_failure");
	assert_eq!(entries[1]["changed"], false);

	Ok(())
}

#[test]
fn update_uses_dialects_from_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("incl.toml"),
		"[dialects]\nsql = \"--\"\n",
	)?;
	std::fs::write(tmp.path().join("view.sql"), "select 1;\n")?;
	std::fs::write(
		tmp.path().join("schema.sql"),
		"--%begin-include view.sql\n--%end-include\n",
	)?;

	incl_cmd()
		.current_dir(tmp.path())
		.arg("schema.sql")
		.assert()
		.success()
		.stdout(predicate::str::contains("schema.sql: Updated (1 include)"));

	let content = std::fs::read_to_string(tmp.path().join("schema.sql"))?;
	assert!(content.starts_with("--%begin-include view.sql\nselect 1;\n--%end-include "));

	Ok(())
}

#[test]
fn update_fails_on_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("custom.toml"), "max_depth = \"deep\"\n")?;
	std::fs::write(tmp.path().join("app.js"), "app();\n")?;

	incl_cmd()
		.current_dir(tmp.path())
		.args(["--config", "custom.toml", "app.js"])
		.assert()
		.code(incl_cli::FATAL_EXIT_CODE)
		.stderr(predicate::str::contains("failed to parse config file"));

	Ok(())
}

#[test]
fn update_fatal_exit_code_is_distinct_from_error_counts() {
	assert_eq!(incl_cli::exit_code(0), 0);
	assert_eq!(incl_cli::exit_code(2), 2);
	assert_eq!(incl_cli::exit_code(254), 254);
	assert_eq!(incl_cli::exit_code(255), 254);
	assert_eq!(incl_cli::exit_code(100_000), 254);
	assert_ne!(incl_cli::exit_code(usize::MAX), incl_cli::FATAL_EXIT_CODE);
}

#[test]
fn update_requires_files() {
	incl_cmd().assert().failure();
}
