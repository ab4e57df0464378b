//! Database-backed store implementations using SeaORM
//!
//! `DbRelationalStore` holds instances and field records in `vnf_instances`
//! and `vnf_definitions`. `DbDocumentStore` keeps the document mirror as JSON
//! bodies in `mirror_documents`, on its own connection so the two stores fail
//! independently. Tables are created on connect if they do not exist.

use crate::store::document::{DocumentFilter, DocumentStore};
use crate::store::entities::{definition, document, instance};
use crate::store::entities::{DefinitionEntity, InstanceEntity, MirrorDocumentEntity};
use crate::store::errors::StoreError;
use crate::store::models::{Document, FieldRecord, Instance, InstanceQuery, Page, RecordQuery};
use crate::store::relational::RelationalStore;
use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::sea_query::TableCreateStatement;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Schema, Set,
    TransactionTrait,
};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Create a table if it is missing
async fn create_table(
    db: &DatabaseConnection,
    mut statement: TableCreateStatement,
    table: &str,
) -> Result<()> {
    let backend = db.get_database_backend();
    statement.if_not_exists();
    db.execute(backend.build(&statement))
        .await
        .with_context(|| format!("Failed to create table {table}"))?;
    Ok(())
}

/// Relational store backed by MySQL or PostgreSQL
#[derive(Clone, Debug)]
pub struct DbRelationalStore {
    db: DatabaseConnection,
}

impl DbRelationalStore {
    /// Connect and create the `vnf_instances` and `vnf_definitions` tables
    ///
    /// # Errors
    /// Fails if the database is unreachable or the tables cannot be created.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let db = Database::connect(connection_string)
            .await
            .context("Failed to connect to relational database")?;
        let store = Self::from_connection(db).await?;
        info!("Initialized relational store");
        Ok(store)
    }

    /// Use an existing connection, creating the tables if needed
    ///
    /// # Errors
    /// Fails if the tables cannot be created.
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        let store = Self { db };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        let schema = Schema::new(self.db.get_database_backend());
        // Instances first, definitions reference them
        create_table(
            &self.db,
            schema.create_table_from_entity(InstanceEntity),
            "vnf_instances",
        )
        .await?;
        create_table(
            &self.db,
            schema.create_table_from_entity(DefinitionEntity),
            "vnf_definitions",
        )
        .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RelationalStore for DbRelationalStore {
    async fn create_instance(&self, name: &str) -> Result<Instance, StoreError> {
        let now = Utc::now();
        let model = instance::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        debug!(vnf_id = model.id, operation = "create_instance", "Inserted instance");
        Ok(model.into())
    }

    async fn get_instance(&self, id: i64) -> Result<Option<Instance>, StoreError> {
        Ok(InstanceEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Instance::from))
    }

    async fn list_instances(&self, query: &InstanceQuery) -> Result<Page<Instance>, StoreError> {
        let mut select = InstanceEntity::find();
        if let Some(keyword) = &query.keyword {
            select = select.filter(instance::Column::Name.contains(keyword.as_str()));
        }

        let total = select.clone().count(&self.db).await?;
        let items = select
            .order_by_desc(instance::Column::Id)
            .offset(query.offset())
            .limit(query.page_size)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Instance::from)
            .collect();

        Ok(Page {
            items,
            total,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn all_instances(&self) -> Result<Vec<Instance>, StoreError> {
        Ok(InstanceEntity::find()
            .order_by_asc(instance::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Instance::from)
            .collect())
    }

    async fn delete_instance(&self, id: i64) -> Result<bool, StoreError> {
        // Records are removed explicitly as well so the cascade does not
        // depend on the backend enforcing foreign keys
        let txn = self.db.begin().await?;
        let records = DefinitionEntity::delete_many()
            .filter(definition::Column::VnfId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        let instances = InstanceEntity::delete_by_id(id).exec(&txn).await?.rows_affected;
        txn.commit().await?;

        debug!(vnf_id = id, records, operation = "delete_instance", "Deleted instance");
        Ok(instances > 0)
    }

    async fn insert_records(&self, records: Vec<FieldRecord>) -> Result<Vec<FieldRecord>, StoreError> {
        let txn = self.db.begin().await?;
        let mut inserted = Vec::with_capacity(records.len());
        for record in &records {
            let mut active = definition::ActiveModel::from_record(record);
            active.id = NotSet;
            let model = active.insert(&txn).await?;
            inserted.push(FieldRecord::from(model));
        }
        txn.commit().await?;

        debug!(
            count = inserted.len(),
            operation = "insert_records",
            "Inserted field records"
        );
        Ok(inserted)
    }

    async fn get_record(&self, vnf_id: i64, id: i64) -> Result<Option<FieldRecord>, StoreError> {
        Ok(DefinitionEntity::find_by_id(id)
            .filter(definition::Column::VnfId.eq(vnf_id))
            .one(&self.db)
            .await?
            .map(FieldRecord::from))
    }

    async fn list_records(&self, query: &RecordQuery) -> Result<Page<FieldRecord>, StoreError> {
        let mut select = DefinitionEntity::find().filter(definition::Column::VnfId.eq(query.vnf_id));
        if query.modified_only {
            select = select.filter(definition::Column::Modified.eq(true));
        }

        let total = select.clone().count(&self.db).await?;
        let items = select
            .order_by_asc(definition::Column::Id)
            .offset(query.offset())
            .limit(query.page_size)
            .all(&self.db)
            .await?
            .into_iter()
            .map(FieldRecord::from)
            .collect();

        Ok(Page {
            items,
            total,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn save_record(&self, record: &FieldRecord) -> Result<FieldRecord, StoreError> {
        match definition::ActiveModel::from_record(record).update(&self.db).await {
            Ok(model) => Ok(model.into()),
            Err(DbErr::RecordNotUpdated) => Err(StoreError::not_found("field record", record.id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_record(&self, vnf_id: i64, id: i64) -> Result<bool, StoreError> {
        let result = DefinitionEntity::delete_many()
            .filter(definition::Column::Id.eq(id))
            .filter(definition::Column::VnfId.eq(vnf_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(self.db.ping().await?)
    }
}

/// Document mirror stored as JSON rows
#[derive(Clone, Debug)]
pub struct DbDocumentStore {
    db: DatabaseConnection,
}

impl DbDocumentStore {
    /// Connect and create the `mirror_documents` table
    ///
    /// # Errors
    /// Fails if the database is unreachable or the table cannot be created.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let db = Database::connect(connection_string)
            .await
            .context("Failed to connect to document database")?;
        let store = Self::from_connection(db).await?;
        info!("Initialized document store");
        Ok(store)
    }

    /// # Errors
    /// Fails if the table cannot be created.
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        let schema = Schema::new(db.get_database_backend());
        create_table(
            &db,
            schema.create_table_from_entity(MirrorDocumentEntity),
            "mirror_documents",
        )
        .await?;
        Ok(Self { db })
    }

    fn active_model(collection: &str, body: Document) -> document::ActiveModel {
        document::ActiveModel {
            id: NotSet,
            collection: Set(collection.to_string()),
            vnf_id: Set(body.get("vnf_id").and_then(Value::as_i64)),
            body: Set(Value::Object(body)),
            created_at: Set(Utc::now()),
        }
    }

    /// Rows of `collection` whose body matches `filter`, in insertion order
    async fn matching(
        &self,
        collection: &str,
        filter: &DocumentFilter,
    ) -> Result<Vec<(document::Model, Document)>, StoreError> {
        let mut select = MirrorDocumentEntity::find()
            .filter(document::Column::Collection.eq(collection));
        if let Some(vnf_id) = filter.equals_value("vnf_id").and_then(Value::as_i64) {
            select = select.filter(document::Column::VnfId.eq(vnf_id));
        }

        let rows = select
            .order_by_asc(document::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let Value::Object(body) = row.body.clone() else {
                    warn!(id = row.id, collection, "Skipping mirror row with non-object body");
                    return None;
                };
                filter.is_match(&body).then_some((row, body))
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl DocumentStore for DbDocumentStore {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        Self::active_model(collection, document).insert(&self.db).await?;
        Ok(())
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<(), StoreError> {
        if documents.is_empty() {
            return Ok(());
        }
        let models: Vec<document::ActiveModel> = documents
            .into_iter()
            .map(|body| Self::active_model(collection, body))
            .collect();
        MirrorDocumentEntity::insert_many(models).exec(&self.db).await?;
        Ok(())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &DocumentFilter,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .matching(collection, filter)
            .await?
            .into_iter()
            .next()
            .map(|(_, body)| body))
    }

    async fn find(&self, collection: &str, filter: &DocumentFilter) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .matching(collection, filter)
            .await?
            .into_iter()
            .map(|(_, body)| body)
            .collect())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        updates: Document,
    ) -> Result<u64, StoreError> {
        let Some((row, mut body)) = self.matching(collection, filter).await?.into_iter().next() else {
            return Ok(0);
        };

        body.extend(updates);
        let mut active: document::ActiveModel = row.into();
        active.vnf_id = Set(body.get("vnf_id").and_then(Value::as_i64));
        active.body = Set(Value::Object(body));
        active.update(&self.db).await?;
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: &DocumentFilter) -> Result<u64, StoreError> {
        let Some((row, _)) = self.matching(collection, filter).await?.into_iter().next() else {
            return Ok(0);
        };
        let result = MirrorDocumentEntity::delete_by_id(row.id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(self.db.ping().await?)
    }
}
