use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::permission;

/// Fields of a permission update; `None` leaves the column unchanged
#[derive(Debug, Default)]
pub struct PermissionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub struct PermissionStore {
    db: DatabaseConnection,
}

impl PermissionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<permission::Model>, InternalError> {
        permission::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_permissions", e))
    }

    pub async fn find(&self, permission_id: &str) -> Result<Option<permission::Model>, InternalError> {
        permission::Entity::find_by_id(permission_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_permission", e))
    }

    /// Look a permission up by its unique name
    pub async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<permission::Model>, InternalError> {
        permission::Entity::find()
            .filter(permission::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_permission_by_name", e))
    }

    pub async fn create(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<permission::Model, InternalError> {
        let now = Utc::now().timestamp();
        let new_permission = permission::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name),
            description: Set(description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        new_permission
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("create_permission", e))
    }

    pub async fn update(
        &self,
        permission_id: &str,
        update: PermissionUpdate,
    ) -> Result<Option<permission::Model>, InternalError> {
        let found = permission::Entity::find_by_id(permission_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_permission_to_update", e))?;

        let Some(model) = found else {
            return Ok(None);
        };

        let mut active: permission::ActiveModel = model.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(description) = update.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Utc::now().timestamp());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| InternalError::database("update_permission", e))?;
        Ok(Some(updated))
    }

    /// Delete a permission; join rows in both role and user grant
    /// tables cascade, detaching the permission everywhere it is held
    pub async fn delete(&self, permission_id: &str) -> Result<bool, InternalError> {
        let result = permission::Entity::delete_by_id(permission_id.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete_permission", e))?;
        Ok(result.rows_affected > 0)
    }
}
