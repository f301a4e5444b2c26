//! ghlint: static analysis for GitHub Actions workflows and actions
//!
//! Files are parsed into a positioned YAML tree, classified into a typed
//! object model and checked by independent rules:
//! - [`model`]: `File` → `Content` (`Workflow` | `Action` | `InvalidContent`) → jobs → steps
//! - [`visitor`]: traversal of the model for rules
//! - [`rule`], [`rule_set`], [`analyzer`]: rules, their issues and findings
//! - [`rules`]: the built-in rule catalog
//!
//! # Example
//!
//! ```
//! use ghlint::model::{File, RawFile};
//! use ghlint::rules::default_rule_set;
//! use ghlint::Analyzer;
//!
//! let text = "on: push\njobs:\n  build:\n    runs-on: ubuntu-latest\n    steps:\n      - run: echo ${{ github.head_ref }}\n";
//! let file = File::new(RawFile::new(".github/workflows/ci.yml", text));
//! let findings = Analyzer::new().analyze(&[file], &[default_rule_set()]);
//! assert!(findings.iter().any(|f| f.issue().id == "ShellScriptInjection"));
//! ```

pub mod analyzer;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod location;
pub mod model;
pub mod parser;
pub mod rule;
pub mod rule_set;
pub mod rules;
pub mod schema;
pub mod visitor;

mod backend;

pub use analyzer::Analyzer;
pub use backend::{is_lintable, Backend};
