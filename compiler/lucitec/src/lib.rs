//! Lucite driver library.
//!
//! The front end pipeline is: read the file into a NUL-terminated
//! buffer, pull tokens through the lexer, parse one translation unit
//! (semantic analysis runs inline), then hand the tree to a consumer —
//! here the AST dumper. Diagnostics accumulate for the whole unit and a
//! final tally is printed at exit.

pub mod commands;
pub mod dump;
