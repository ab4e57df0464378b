//! SeaORM entities
//!
//! - `instance`: `vnf_instances`, one row per ingested document
//! - `definition`: `vnf_definitions`, field records owned by an instance
//! - `document`: `mirror_documents`, JSON bodies for the document mirror

pub mod definition;
pub mod document;
pub mod instance;

pub use definition::Entity as DefinitionEntity;
pub use document::Entity as MirrorDocumentEntity;
pub use instance::Entity as InstanceEntity;
