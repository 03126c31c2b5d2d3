//! imlink-filter - Programmatic filter grammar for imlink
//!
//! This crate provides the expression grammar for externally specified
//! dashboard filters: filters that narrow the shared record set without
//! being tied to a selection gesture on any panel.
//!
//! # Expression Syntax
//!
//! - **Comparisons**: `mass > 1e10`, `depth <= 40`, `species == setosa`
//! - **Quoted text**: `name == "Gly 12"`
//!
//! Exactly one comparison per expression; the operator must be one of
//! `<`, `<=`, `>`, `>=`, `==`, `!=`. Anything else is rejected with an
//! explicit parse error rather than installing an undefined filter.
//!
//! # Examples
//!
//! ```ignore
//! use imlink_filter::parse_filter;
//!
//! let spec = parse_filter("mass > 1e10")?;
//! let spec = parse_filter("species == 'setosa'")?;
//! ```

pub mod ast;
pub mod parser;

pub use ast::*;
pub use parser::*;
