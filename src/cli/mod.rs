//! Command-line front end: argument definitions and display plumbing.

pub mod args;
pub mod constants;
