//! Mirror document entity
//!
//! One row per document. `vnf_id` is copied out of the body so lookups by
//! instance are filtered in SQL.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "mirror_documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub collection: String,
    pub vnf_id: Option<i64>,
    #[sea_orm(column_type = "Json")]
    pub body: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
