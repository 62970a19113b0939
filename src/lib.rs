//! shelfgraph - JSON gateway for a library ontology stored in a SPARQL triplestore
//!
//! This crate provides:
//! - Fixed, parameterized SPARQL templates projected into flat JSON records
//! - A pass-through endpoint for read-only ad-hoc SPARQL
//! - Escaped slot substitution and tagged upstream errors

pub mod config;
pub mod server;
