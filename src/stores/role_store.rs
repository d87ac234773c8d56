use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::{permission, role, role_permission};

/// Fields of a role update; `None` leaves the column unchanged
#[derive(Debug, Default)]
pub struct RoleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permission_ids: Option<Vec<String>>,
}

pub struct RoleStore {
    db: DatabaseConnection,
}

impl RoleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All roles, each with its permission set
    pub async fn list_with_permissions(
        &self,
    ) -> Result<Vec<(role::Model, Vec<permission::Model>)>, InternalError> {
        let roles = role::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_roles", e))?;

        let mut result = Vec::with_capacity(roles.len());
        for role in roles {
            let permissions = role
                .find_related(permission::Entity)
                .all(&self.db)
                .await
                .map_err(|e| InternalError::database("load_role_permissions", e))?;
            result.push((role, permissions));
        }
        Ok(result)
    }

    /// A single role with its permission set
    pub async fn find_with_permissions(
        &self,
        role_id: &str,
    ) -> Result<Option<(role::Model, Vec<permission::Model>)>, InternalError> {
        let found = role::Entity::find_by_id(role_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_role", e))?;

        let Some(role) = found else {
            return Ok(None);
        };

        let permissions = role
            .find_related(permission::Entity)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("load_role_permissions", e))?;
        Ok(Some((role, permissions)))
    }

    /// Look a role up by its unique name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<role::Model>, InternalError> {
        role::Entity::find()
            .filter(role::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_role_by_name", e))
    }

    /// Create a role, optionally with an initial permission set
    pub async fn create(
        &self,
        name: String,
        description: Option<String>,
        permission_ids: &[String],
    ) -> Result<(role::Model, Vec<permission::Model>), InternalError> {
        let now = Utc::now().timestamp();
        let new_role = role::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name),
            description: Set(description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = new_role
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("create_role", e))?;

        self.set_permissions(&created.id, permission_ids).await?;

        let permissions = created
            .find_related(permission::Entity)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("load_role_permissions", e))?;
        Ok((created, permissions))
    }

    /// Apply a partial update; a provided permission id list replaces
    /// the role's full permission set
    pub async fn update(
        &self,
        role_id: &str,
        update: RoleUpdate,
    ) -> Result<Option<(role::Model, Vec<permission::Model>)>, InternalError> {
        let found = role::Entity::find_by_id(role_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_role_to_update", e))?;

        let Some(model) = found else {
            return Ok(None);
        };

        let mut active: role::ActiveModel = model.into();
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
            .map_err(|e| InternalError::database("update_role", e))?;

        if let Some(permission_ids) = update.permission_ids {
            self.set_permissions(&updated.id, &permission_ids).await?;
        }

        let permissions = updated
            .find_related(permission::Entity)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("load_role_permissions", e))?;
        Ok(Some((updated, permissions)))
    }

    /// Delete a role
    ///
    /// Users referencing the role fall back to a null role via the
    /// schema's SET NULL foreign key; join rows cascade.
    pub async fn delete(&self, role_id: &str) -> Result<bool, InternalError> {
        let result = role::Entity::delete_by_id(role_id.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete_role", e))?;
        Ok(result.rows_affected > 0)
    }

    /// Replace a role's permission set with the given ids
    pub async fn set_permissions(
        &self,
        role_id: &str,
        permission_ids: &[String],
    ) -> Result<(), InternalError> {
        role_permission::Entity::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("clear_role_permissions", e))?;

        for permission_id in permission_ids {
            let link = role_permission::ActiveModel {
                role_id: Set(role_id.to_string()),
                permission_id: Set(permission_id.clone()),
            };
            link.insert(&self.db)
                .await
                .map_err(|e| InternalError::database("grant_role_permission", e))?;
        }

        Ok(())
    }
}
