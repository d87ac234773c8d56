use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter,
};
use chrono::Utc;

use crate::errors::InternalError;
use crate::types::db::{permission, role, user, user_permission};
use crate::types::internal::access::UserWithAccess;

/// Fields of a user update; `None` leaves the column unchanged
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<String>,
    pub is_active: Option<bool>,
}

/// UserStore is the identity loader: it assembles the per-request
/// snapshot of a user together with its role and permissions, and
/// carries the user CRUD operations.
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Load a user with its role, the role's permissions and the
    /// user's direct permissions
    ///
    /// # Returns
    /// * `Ok(Some(UserWithAccess))` - Snapshot for the authorization core
    /// * `Ok(None)` - No user with this id
    /// * `Err(InternalError)` - The store is unavailable
    pub async fn load_with_access(
        &self,
        user_id: &str,
    ) -> Result<Option<UserWithAccess>, InternalError> {
        let found = user::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("load_user", e))?;

        match found {
            Some(model) => Ok(Some(self.assemble_access(model).await?)),
            None => Ok(None),
        }
    }

    /// Load a user by email, with role and permissions (login path)
    pub async fn find_by_email_with_access(
        &self,
        email: &str,
    ) -> Result<Option<UserWithAccess>, InternalError> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_user_by_email", e))?;

        match found {
            Some(model) => Ok(Some(self.assemble_access(model).await?)),
            None => Ok(None),
        }
    }

    /// Paginated user list; returns the page plus the total row count
    pub async fn list_paginated(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<UserWithAccess>, u64), InternalError> {
        let paginator = user::Entity::find().paginate(&self.db, limit.max(1));
        let total = paginator
            .num_items()
            .await
            .map_err(|e| InternalError::database("count_users", e))?;
        let models = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| InternalError::database("list_users", e))?;

        let mut users = Vec::with_capacity(models.len());
        for model in models {
            users.push(self.assemble_access(model).await?);
        }
        Ok((users, total))
    }

    /// Unpaginated user list
    pub async fn list_all(&self) -> Result<Vec<UserWithAccess>, InternalError> {
        let models = user::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_all_users", e))?;

        let mut users = Vec::with_capacity(models.len());
        for model in models {
            users.push(self.assemble_access(model).await?);
        }
        Ok(users)
    }

    /// Users filtered by role name; an unknown role yields an empty list
    pub async fn list_by_role(&self, role_name: &str) -> Result<Vec<UserWithAccess>, InternalError> {
        let role = role::Entity::find()
            .filter(role::Column::Name.eq(role_name))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_role_by_name", e))?;

        let Some(role) = role else {
            return Ok(Vec::new());
        };

        let models = user::Entity::find()
            .filter(user::Column::RoleId.eq(role.id))
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_users_by_role", e))?;

        let mut users = Vec::with_capacity(models.len());
        for model in models {
            users.push(self.assemble_access(model).await?);
        }
        Ok(users)
    }

    /// Apply a partial update to a user
    ///
    /// # Returns
    /// * `Ok(Some(UserWithAccess))` - The updated snapshot
    /// * `Ok(None)` - No user with this id
    pub async fn update(
        &self,
        user_id: &str,
        update: UserUpdate,
    ) -> Result<Option<UserWithAccess>, InternalError> {
        let found = user::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_user_to_update", e))?;

        let Some(model) = found else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = model.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(email) = update.email {
            active.email = Set(email);
        }
        if let Some(role_id) = update.role_id {
            active.role_id = Set(Some(role_id));
        }
        if let Some(is_active) = update.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().timestamp());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| InternalError::database("update_user", e))?;

        Ok(Some(self.assemble_access(updated).await?))
    }

    /// Delete a user; join rows cascade via the schema
    ///
    /// # Returns
    /// * `Ok(true)` - User removed
    /// * `Ok(false)` - No user with this id
    pub async fn delete(&self, user_id: &str) -> Result<bool, InternalError> {
        let result = user::Entity::delete_by_id(user_id.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete_user", e))?;
        Ok(result.rows_affected > 0)
    }

    /// Replace the user's direct permission set
    ///
    /// The supplied ids become the complete set of direct grants;
    /// previous grants not in the list are removed.
    pub async fn set_direct_permissions(
        &self,
        user_id: &str,
        permission_ids: &[String],
    ) -> Result<Option<UserWithAccess>, InternalError> {
        let found = user::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_user_for_permissions", e))?;

        let Some(model) = found else {
            return Ok(None);
        };

        user_permission::Entity::delete_many()
            .filter(user_permission::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("clear_user_permissions", e))?;

        for permission_id in permission_ids {
            let link = user_permission::ActiveModel {
                user_id: Set(user_id.to_string()),
                permission_id: Set(permission_id.clone()),
            };
            link.insert(&self.db)
                .await
                .map_err(|e| InternalError::database("grant_user_permission", e))?;
        }

        Ok(Some(self.assemble_access(model).await?))
    }

    /// Assemble the access snapshot for an already-fetched user row
    async fn assemble_access(&self, model: user::Model) -> Result<UserWithAccess, InternalError> {
        let direct_permissions = model
            .find_related(permission::Entity)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("load_direct_permissions", e))?;

        let role = match &model.role_id {
            Some(role_id) => role::Entity::find_by_id(role_id.clone())
                .one(&self.db)
                .await
                .map_err(|e| InternalError::database("load_role", e))?,
            None => None,
        };

        let role_permissions = match &role {
            Some(role) => role
                .find_related(permission::Entity)
                .all(&self.db)
                .await
                .map_err(|e| InternalError::database("load_role_permissions", e))?,
            None => Vec::new(),
        };

        Ok(UserWithAccess {
            user: model,
            role,
            role_permissions,
            direct_permissions,
        })
    }
}
