//! `incl_core` is the engine behind `update-includes`. It expands include
//! blocks in source files: the region between a `%begin-include <path>` line
//! and its `%end-include` line is replaced with the flattened content of
//! `<path>`, and the closing line is stamped with the SHA-1 of what was
//! written. On later runs a block is only regenerated while the stamp still
//! matches, so hand edits inside a block are never silently overwritten.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Input file
//!   → Dialect table (extension → comment leader)
//!   → Directive matcher (finds `<leader>%begin-include` / `%end-include` / `%include` lines)
//!   → Block rewriter (validates pairs, checks stamps, splices content)
//!   → Include resolver (flattens `%include` lines recursively, cached per run)
//!   → Engine (writes changed files atomically, builds the status table)
//! ```
//!
//! ## Directive Syntax
//!
//! ```text
//! //%begin-include lib/helpers.js
//! ...managed content...
//! //%end-include 3f786850e387550fdab836ed7e6dc881de23001b
//! ```
//!
//! The leader (`//` above) depends on the file extension. Files that are
//! themselves included may only contain the flat `%include <path>` form.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use incl_core::IncludeContext;
//! use incl_core::RunOptions;
//! use incl_core::run;
//!
//! let mut ctx = IncludeContext::default();
//! let report = run(&mut ctx, &["src/app.js"], RunOptions::default()).unwrap();
//! println!("{}", report.summary());
//! std::process::exit(report.error_count() as i32);
//! ```

pub use config::*;
pub use dialect::*;
pub use directive::*;
pub use engine::*;
pub use error::*;
pub use hash::*;
pub use resolver::*;
pub use rewriter::*;

pub mod config;
mod dialect;
mod directive;
mod engine;
#[allow(unused_assignments)]
mod error;
mod hash;
mod resolver;
mod rewriter;

#[cfg(test)]
mod __fixtures;
