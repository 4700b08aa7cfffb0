use std::path::Path;
use std::process;

use clap::Parser;
use incl_cli::FATAL_EXIT_CODE;
use incl_cli::InclCli;
use incl_cli::OutputFormat;
use incl_core::FileOutcome;
use incl_core::InclConfig;
use incl_core::InclError;
use incl_core::IncludeContext;
use incl_core::RewriteStatus;
use incl_core::RunOptions;
use incl_core::RunReport;
use owo_colors::OwoColorize;
use serde::Serialize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = InclCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_logging(args.verbose, use_color);

	let code = match run(&args) {
		Ok(error_count) => incl_cli::exit_code(error_count),
		Err(e) => {
			match e.downcast::<InclError>() {
				Ok(incl_err) => {
					let report: miette::Report = (*incl_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			FATAL_EXIT_CODE
		}
	};

	process::exit(code);
}

/// Log to stderr. `--verbose` shows debug events; otherwise the `INCL_LOG`
/// env var is used as a filter, falling back to warnings only.
fn init_logging(verbose: bool, use_color: bool) {
	let filter = if verbose {
		EnvFilter::new("debug")
	} else {
		EnvFilter::try_from_env("INCL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn load_config(args: &InclCli) -> Result<InclConfig, InclError> {
	if let Some(path) = &args.config {
		tracing::debug!(path = %path.display(), "loading config");
		return InclConfig::load_from(path);
	}

	let root = std::env::current_dir()?;
	match InclConfig::resolve_path(&root) {
		Some(path) => {
			tracing::debug!(path = %path.display(), "loading config");
			InclConfig::load_from(&path)
		}
		None => Ok(InclConfig::default()),
	}
}

/// Run over every input file and return the number of files that failed.
fn run(args: &InclCli) -> Result<usize, Box<dyn std::error::Error>> {
	let config = load_config(args)?;
	let mut ctx = IncludeContext::from_config(&config);
	let options = RunOptions {
		force: args.force,
		dry_run: args.dry_run,
	};

	let report = incl_core::run(&mut ctx, &args.files, options)?;

	match args.format {
		OutputFormat::Text => {
			if args.dry_run {
				print_pending_changes(&report);
			}
			print_summary(&report);

			if args.dry_run && report.changed_count() > 0 {
				println!(
					"Dry run: {} file(s) would be updated; nothing was written.",
					report.changed_count()
				);
			}

			if args.verbose {
				println!(
					"Resolved {} included file(s), wrote {} file(s).",
					ctx.resolved_count(),
					report.written
				);
			}
		}
		OutputFormat::Json => {
			let entries: Vec<JsonOutcome> = report.outcomes.iter().map(JsonOutcome::from).collect();
			println!("{}", serde_json::to_string_pretty(&entries)?);
		}
	}

	Ok(report.error_count())
}

fn print_summary(report: &RunReport) {
	let summary = report.summary();
	if report.outcomes.is_empty() {
		println!("{summary}");
		return;
	}

	for (line, outcome) in summary.lines().zip(&report.outcomes) {
		match &outcome.result {
			Err(_) => println!("{}", colored!(line, red)),
			Ok(status) if status.is_changed() => println!("{}", colored!(line, green)),
			Ok(_) => println!("{line}"),
		}
	}
}

fn print_pending_changes(report: &RunReport) {
	for outcome in &report.outcomes {
		let Some(change) = &outcome.change else {
			continue;
		};

		println!(
			"{}",
			colored!(format!("Would update {}:", outcome.path.display()), bold)
		);
		print_diff(
			&String::from_utf8_lossy(&change.original),
			&String::from_utf8_lossy(&change.updated),
		);
		println!();
	}
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				print!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				print!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				print!("   {change}");
			}
		}
		if change.missing_newline() {
			println!();
		}
	}
}

#[derive(Serialize)]
struct JsonOutcome {
	file: String,
	status: &'static str,
	message: String,
	includes: usize,
	changed: bool,
	error: Option<String>,
	kind: Option<&'static str>,
}

impl From<&FileOutcome> for JsonOutcome {
	fn from(outcome: &FileOutcome) -> Self {
		let status = match &outcome.result {
			Ok(RewriteStatus::NoIncludes) => "no_includes",
			Ok(RewriteStatus::Unchanged(_)) => "unchanged",
			Ok(RewriteStatus::Updated(_)) => "updated",
			Err(_) => "error",
		};

		Self {
			file: display_path(&outcome.path),
			status,
			message: outcome.message(),
			includes: outcome.result.as_ref().map_or(0, |status| status.includes()),
			changed: outcome.change.is_some(),
			error: outcome.result.as_ref().err().map(ToString::to_string),
			kind: outcome.error_kind().map(|kind| kind.as_str()),
		}
	}
}

fn display_path(path: &Path) -> String {
	path.display().to_string().replace('\\', "/")
}
