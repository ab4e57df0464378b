//! Field record entity

use crate::store::models::FieldRecord;
use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "vnf_definitions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub vnf_id: i64,
    pub parameter_name: String,
    #[sea_orm(column_type = "Text")]
    pub default_value: String,
    #[sea_orm(column_type = "Text")]
    pub description_text: String,
    #[sea_orm(column_name = "type")]
    pub field_type: String,
    pub can_be_updated: bool,
    pub hidden_condition: String,
    pub optional: bool,
    #[sea_orm(column_type = "Text")]
    pub constraints: String,
    #[sea_orm(column_type = "Text")]
    pub current_value: String,
    pub modified: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::instance::Entity",
        from = "Column::VnfId",
        to = "super::instance::Column::Id",
        on_delete = "Cascade"
    )]
    Instance,
}

impl Related<super::instance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for FieldRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            vnf_id: model.vnf_id,
            parameter_name: model.parameter_name,
            default_value: model.default_value,
            description_text: model.description_text,
            field_type: model.field_type,
            can_be_updated: model.can_be_updated,
            hidden_condition: model.hidden_condition,
            optional: model.optional,
            constraints: model.constraints,
            current_value: model.current_value,
            modified: model.modified,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl ActiveModel {
    /// Active model for `record`; the id is left unset when it is 0 so the
    /// database assigns one
    pub fn from_record(record: &FieldRecord) -> Self {
        Self {
            id: if record.id == 0 { NotSet } else { Set(record.id) },
            vnf_id: Set(record.vnf_id),
            parameter_name: Set(record.parameter_name.clone()),
            default_value: Set(record.default_value.clone()),
            description_text: Set(record.description_text.clone()),
            field_type: Set(record.field_type.clone()),
            can_be_updated: Set(record.can_be_updated),
            hidden_condition: Set(record.hidden_condition.clone()),
            optional: Set(record.optional),
            constraints: Set(record.constraints.clone()),
            current_value: Set(record.current_value.clone()),
            modified: Set(record.modified),
            created_at: Set(record.created_at),
            updated_at: Set(record.updated_at),
        }
    }
}
