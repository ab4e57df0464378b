//! VNF Configuration Catalogue Library
//!
//! Turns human-authored YAML configuration documents into a flat catalogue of
//! typed fields and records it across a relational store and a document mirror.
//!
//! - [`parser`]: document tree → [`parser::ParsedConfiguration`]
//! - [`store`]: store backends and the dual-store write coordinator
//! - [`service`]: ingest flow plus instance and field record operations
//! - [`config`]: settings from the environment

pub mod config;
pub mod constants;
pub mod parser;
pub mod service;
pub mod store;
