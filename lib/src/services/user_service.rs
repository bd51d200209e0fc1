// lib/src/services/user_service.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use models::medical::{NewUser, Role, User, UserInput};
use models::validation;

use crate::errors::{HospitalError, Result};
use crate::storage_engine::DocumentStorageEngine;

pub struct UserService {
    users: Arc<dyn DocumentStorageEngine<User>>,
    bcrypt_cost: u32,
}

fn duplicate_email() -> HospitalError {
    HospitalError::Conflict("Email already exists".to_string())
}

impl UserService {
    pub fn new(users: Arc<dyn DocumentStorageEngine<User>>, bcrypt_cost: u32) -> Self {
        Self { users, bcrypt_cost }
    }

    pub async fn create(&self, input: &UserInput) -> Result<User> {
        let new_user = input.validate_new()?;
        self.insert_new(new_user).await
    }

    async fn insert_new(&self, new_user: NewUser) -> Result<User> {
        if self.users.find_by_email(&new_user.email).await?.is_some() {
            return Err(duplicate_email());
        }
        let cost = self.bcrypt_cost;
        let user = tokio::task::spawn_blocking(move || User::from_new_user(new_user, cost)).await??;
        self.users.insert(&user).await?;
        info!("Created {} user {}", user.role, user.email);
        Ok(user)
    }

    pub async fn get(&self, id: &Uuid) -> Result<User> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| HospitalError::NotFound("User not found".to_string()))
    }

    /// Looks a user up by email, normalising it first.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users.find_by_email(&validation::normalize_email(email)).await
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let mut users = self.users.list().await?;
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    /// Updates name and email. The role is never changed here.
    pub async fn update(&self, id: &Uuid, input: &UserInput) -> Result<User> {
        let patch = input.validate_patch()?;
        let mut user = self.get(id).await?;
        if let Some(email) = &patch.email {
            if let Some(other) = self.users.find_by_email(email).await? {
                if other.id != user.id {
                    return Err(duplicate_email());
                }
            }
        }
        user.apply(patch);
        self.users.replace(&user).await?;
        Ok(user)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<User> {
        let removed = self
            .users
            .remove(id)
            .await?
            .ok_or_else(|| HospitalError::NotFound("User not found".to_string()))?;
        info!("Deleted user {}", removed.email);
        Ok(removed)
    }

    pub async fn record_login(&self, mut user: User) -> Result<User> {
        user.last_login = Some(Utc::now());
        self.users.replace(&user).await?;
        Ok(user)
    }

    /// Creates an admin account unless one already uses `email`.
    /// Returns the user and whether it was newly created.
    pub async fn ensure_admin(&self, name: &str, email: &str, password: &str) -> Result<(User, bool)> {
        if let Some(existing) = self.find_by_email(email).await? {
            return Ok((existing, false));
        }
        let new_user = UserInput {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            role: Some(Role::Admin.to_string()),
        }
        .validate_new()?;
        let user = self.insert_new(new_user).await?;
        Ok((user, true))
    }

    pub async fn count(&self) -> Result<usize> {
        self.users.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn input(email: &str, role: Option<&str>) -> UserInput {
        UserInput {
            name: Some("Nurse Joy".to_string()),
            email: Some(email.to_string()),
            password: Some("secret1".to_string()),
            role: role.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn should_create_user_with_hashed_password() {
        let db = Database::temporary().unwrap();
        let user = db.users.create(&input("Joy@H.com", None)).await.unwrap();
        assert_eq!(user.role, Role::Staff);
        assert_eq!(user.email, "joy@h.com");
        assert!(User::verify_password("secret1", &user.password_hash).unwrap());
        assert_eq!(db.users.find_by_email(" JOY@h.com").await.unwrap().map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn should_reject_duplicate_user_email() {
        let db = Database::temporary().unwrap();
        db.users.create(&input("joy@h.com", None)).await.unwrap();
        let err = db.users.create(&input("JOY@h.com", Some("doctor"))).await.unwrap_err();
        assert!(matches!(err, HospitalError::Conflict(_)));
    }

    #[tokio::test]
    async fn should_ignore_role_on_update() {
        let db = Database::temporary().unwrap();
        let user = db.users.create(&input("joy@h.com", Some("staff"))).await.unwrap();
        let patch = UserInput {
            name: Some("Joy Renamed".to_string()),
            role: Some("admin".to_string()),
            ..Default::default()
        };
        let updated = db.users.update(&user.id, &patch).await.unwrap();
        assert_eq!(updated.name, "Joy Renamed");
        assert_eq!(updated.role, Role::Staff);
    }

    #[tokio::test]
    async fn should_create_admin_once() {
        let db = Database::temporary().unwrap();
        let (admin, created) = db.users.ensure_admin("Admin", "admin@admin.com", "admin123").await.unwrap();
        assert!(created);
        assert_eq!(admin.role, Role::Admin);

        let (again, created) = db.users.ensure_admin("Admin", "admin@admin.com", "other-pw").await.unwrap();
        assert!(!created);
        assert_eq!(again.id, admin.id);
        assert_eq!(db.users.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn should_delete_user() {
        let db = Database::temporary().unwrap();
        let user = db.users.create(&input("joy@h.com", None)).await.unwrap();
        db.users.delete(&user.id).await.unwrap();
        assert!(matches!(db.users.get(&user.id).await, Err(HospitalError::NotFound(_))));
    }
}
