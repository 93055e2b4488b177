//! Attribute Repository

use super::{BaseRepository, RepoError, RepoResult, record_key};
use crate::db::models::{Attribute, AttributeCreate, AttributeUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const ATTRIBUTE_TABLE: &str = "attribute";

#[derive(Clone)]
pub struct AttributeRepository {
    base: BaseRepository,
}

impl AttributeRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Attribute>> {
        let attributes: Vec<Attribute> = self
            .base
            .db()
            .query("SELECT * FROM attribute WHERE is_active = true ORDER BY name")
            .await?
            .take(0)?;
        Ok(attributes)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Attribute>> {
        let pure_id = record_key(ATTRIBUTE_TABLE, id);
        let attribute: Option<Attribute> =
            self.base.db().select((ATTRIBUTE_TABLE, pure_id)).await?;
        Ok(attribute)
    }

    pub async fn create(&self, data: AttributeCreate) -> RepoResult<Attribute> {
        let attribute = Attribute {
            id: None,
            name: data.name,
            values: data.values.unwrap_or_default(),
            is_active: true,
        };

        let created: Option<Attribute> = self
            .base
            .db()
            .create(ATTRIBUTE_TABLE)
            .content(attribute)
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create attribute".to_string()))
    }

    pub async fn update(&self, id: &str, data: AttributeUpdate) -> RepoResult<Attribute> {
        let pure_id = record_key(ATTRIBUTE_TABLE, id);
        let thing = surrealdb::RecordId::from_table_key(ATTRIBUTE_TABLE, pure_id);

        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.values.is_some() {
            set_parts.push("values = $values");
        }
        if data.is_active.is_some() {
            set_parts.push("is_active = $is_active");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(pure_id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Attribute {} not found", id)));
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));

        let mut query = self.base.db().query(&query_str).bind(("thing", thing));
        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.values {
            query = query.bind(("values", v));
        }
        if let Some(v) = data.is_active {
            query = query.bind(("is_active", v));
        }

        let updated: Vec<Attribute> = query.await?.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Attribute {} not found", id)))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let pure_id = record_key(ATTRIBUTE_TABLE, id);
        let deleted: Option<Attribute> = self.base.db().delete((ATTRIBUTE_TABLE, pure_id)).await?;
        Ok(deleted.is_some())
    }
}
