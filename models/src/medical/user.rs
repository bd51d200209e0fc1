// models/src/medical/user.rs
// Users exist only for authentication and authorization; they are not clinical records.

use bcrypt::{hash, verify, BcryptError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationErrors, ValidationResult};
use crate::medical::role::Role;
use crate::validation;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Validated registration data. Holds the plaintext password until it is hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// A user as stored. Never serialize this into an API response; use [`UserProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn hash_password(password: &str, cost: u32) -> Result<String, BcryptError> {
        hash(password, cost)
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool, BcryptError> {
        verify(password, hash)
    }

    /// Creates a `User` from a `NewUser`, hashing the password with the given bcrypt cost.
    pub fn from_new_user(new_user: NewUser, cost: u32) -> Result<Self, BcryptError> {
        let now = Utc::now();
        let password_hash = Self::hash_password(&new_user.password, cost)?;

        Ok(User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash,
            role: new_user.role,
            created_at: now,
            updated_at: now,
            last_login: None,
        })
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
            last_login: self.last_login,
        }
    }

    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        self.updated_at = Utc::now();
    }
}

/// Public projection of a user, without the credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Partial user update. Role changes are deliberately not part of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserInput {
    pub fn validate_new(&self) -> ValidationResult<NewUser> {
        let mut errors = ValidationErrors::new();
        let name = self.check_name(&mut errors, true);
        let email = self.check_email(&mut errors, true);

        let password = match self.password.as_deref() {
            Some(p) if validation::char_len(p) >= MIN_PASSWORD_LEN => Some(p.to_string()),
            Some(_) => {
                errors.push("password", "Password must be at least 6 characters");
                None
            }
            None => {
                errors.push("password", "Required");
                None
            }
        };

        let role = match self.role.as_deref() {
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(_) => {
                    errors.push("role", "Role must be one of: admin, doctor, staff");
                    None
                }
            },
            None => Some(Role::default()),
        };

        match (name, email, password, role) {
            (Some(name), Some(email), Some(password), Some(role)) if errors.is_empty() => {
                Ok(NewUser { name, email, password, role })
            }
            _ => Err(errors),
        }
    }

    pub fn validate_patch(&self) -> ValidationResult<UserPatch> {
        let mut errors = ValidationErrors::new();
        let patch = UserPatch {
            name: self.check_name(&mut errors, false),
            email: self.check_email(&mut errors, false),
        };
        errors.finish(patch)
    }

    fn check_name(&self, errors: &mut ValidationErrors, required: bool) -> Option<String> {
        match self.name.as_deref().map(str::trim) {
            Some(name) if validation::char_len(name) >= 2 => Some(name.to_string()),
            Some(_) => {
                errors.push("name", "Name must be at least 2 characters");
                None
            }
            None => {
                errors.check(required, "name", "Required");
                None
            }
        }
    }

    fn check_email(&self, errors: &mut ValidationErrors, required: bool) -> Option<String> {
        match self.email.as_deref().map(str::trim) {
            Some(email) if validation::is_valid_email(email) => {
                Some(validation::normalize_email(email))
            }
            Some(_) => {
                errors.push("email", "Invalid email address");
                None
            }
            None => {
                errors.check(required, "email", "Required");
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_hash_and_verify_password() {
        let user = User::from_new_user(
            NewUser {
                name: "Admin".to_string(),
                email: "admin@admin.com".to_string(),
                password: "admin123".to_string(),
                role: Role::Admin,
            },
            4,
        )
        .unwrap();
        assert_ne!(user.password_hash, "admin123");
        assert!(User::verify_password("admin123", &user.password_hash).unwrap());
        assert!(!User::verify_password("wrong", &user.password_hash).unwrap());
    }

    #[test]
    fn should_default_role_to_staff() {
        let input = UserInput {
            name: Some("Nina".to_string()),
            email: Some("NINA@Hospital.org".to_string()),
            password: Some("secret1".to_string()),
            role: None,
        };
        let new_user = input.validate_new().unwrap();
        assert_eq!(new_user.role, Role::Staff);
        assert_eq!(new_user.email, "nina@hospital.org");
    }

    #[test]
    fn should_reject_short_password_and_bad_role() {
        let input = UserInput {
            name: Some("Nina".to_string()),
            email: Some("nina@hospital.org".to_string()),
            password: Some("123".to_string()),
            role: Some("janitor".to_string()),
        };
        let errors = input.validate_new().unwrap_err();
        assert!(errors.has_path("password"));
        assert!(errors.has_path("role"));
    }

    #[test]
    fn should_not_leak_hash_in_profile() {
        let user = User::from_new_user(
            NewUser {
                name: "Staff".to_string(),
                email: "staff@h.com".to_string(),
                password: "password".to_string(),
                role: Role::Staff,
            },
            4,
        )
        .unwrap();
        let json = serde_json::to_value(user.profile()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "staff");
    }
}
