//! # Parser
//!
//! Configuration document classification and field extraction.
//!
//! - `node`: owned YAML tree
//! - `path`: field addresses
//! - `infer`: value shape → field type
//! - `classify`: what a node is
//! - `extract`: descriptor mappings and leaves → field descriptors
//! - `special`: document metadata, groups, schema and version
//! - `validate`: advisory warnings and grouping
//! - `file_finder`: pick the document inside a bundle directory
//! - `parsers`: the walk that ties them together

pub mod classify;
pub mod extract;
pub mod file_finder;
pub mod infer;
pub mod node;
pub mod parsers;
pub mod path;
pub mod special;
pub mod types;
pub mod validate;

pub use file_finder::find_config_document;
pub use node::{ConfigNode, Scalar};
pub use parsers::{parse_document, parse_file, ParseError};
pub use types::{FieldDescriptor, FieldType, ParsedConfiguration};
pub use validate::{group_fields, validate};
