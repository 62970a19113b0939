//! Integration tests - the HTTP surface wired to a SPARQL engine
//!
//! Most tests mock the transport; `http_transport_tests` runs a local fake
//! engine so the real HTTP client is exercised without a triplestore.

mod common;
mod pass_through_tests;
