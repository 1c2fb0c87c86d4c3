//! ui
//!
//! Terminal output.
//!
//! # Design
//!
//! Every line the tool prints goes through [`output`], which applies the
//! global `--quiet` and `--debug` flags. Warnings and errors go to stderr,
//! and errors are printed even when quiet. Resource listings are built
//! with [`table`] and printed like any other line.

pub mod output;
pub mod table;
