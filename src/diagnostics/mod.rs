//! Conversion of findings into LSP diagnostics

mod collector;

pub use collector::{severity_for, DiagnosticCollector, SOURCE};
