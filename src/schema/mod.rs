//! Keyword tables for workflow and action files

pub mod actions;
pub mod workflows;
