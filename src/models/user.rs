use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Model;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub name: String,
    pub handle: String,
    pub photo: String,
    pub role: UserRole,
    pub password: String,
    pub following: Vec<ObjectId>,
    /// Back-reference to the one profile owned by this user. Written exactly
    /// once, at profile-creation time.
    pub profile: Option<ObjectId>,
    pub password_changed_at: Option<DateTime>,
    pub date: DateTime,
}

impl Model for User {
    const COLLECTION: &'static str = "users";
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

/// User as exposed over the API and embedded in token claims. Never carries
/// the password hash.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserPayload {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub email: String,
    pub name: String,
    pub handle: String,
    pub photo: String,
    pub role: UserRole,
    pub following: Vec<ObjectId>,
    pub profile: Option<ObjectId>,
}

impl From<User> for UserPayload {
    fn from(user: User) -> Self {
        UserPayload {
            id: user.id,
            email: user.email,
            name: user.name,
            handle: user.handle,
            photo: user.photo,
            role: user.role,
            following: user.following,
            profile: user.profile,
        }
    }
}

#[derive(Debug, Deserialize, Default, Validate)]
#[serde(default)]
pub struct RegisterDto {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Please tell us your name"))]
    pub name: String,
    #[validate(length(min = 1, max = 12, message = "Handle must be between 1 and 12 characters"))]
    pub handle: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords must match"))]
    pub password_confirm: String,
}

#[derive(Debug, Deserialize, Default, Validate)]
#[serde(default)]
pub struct LoginDto {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Please provide a password"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Default, Validate)]
#[serde(default)]
pub struct UpdateAccountDto {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Please tell us your name"))]
    pub name: String,
    #[validate(length(min = 1, max = 12, message = "Handle must be between 1 and 12 characters"))]
    pub handle: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: Some(ObjectId::new()),
            email: "dev@example.com".to_string(),
            name: "Dev".to_string(),
            handle: "dev".to_string(),
            photo: "default.jpg".to_string(),
            role: UserRole::User,
            password: "$2b$12$secret-hash".to_string(),
            following: vec![ObjectId::new()],
            profile: Some(ObjectId::new()),
            password_changed_at: None,
            date: DateTime::from_millis(Utc::now().timestamp_millis()),
        }
    }

    #[test]
    fn payload_keeps_profile_reference_and_drops_password() {
        let user = sample_user();
        let profile = user.profile;
        let payload = UserPayload::from(user);

        assert_eq!(payload.profile, profile);
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("_id").is_some());
    }

    #[test]
    fn register_requires_matching_password_confirm() {
        let dto = RegisterDto {
            email: "dev@example.com".to_string(),
            name: "Dev".to_string(),
            handle: "dev".to_string(),
            password: "password123".to_string(),
            password_confirm: "password124".to_string(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirm"));
    }

    #[test]
    fn register_rejects_overlong_handle() {
        let dto = RegisterDto {
            email: "dev@example.com".to_string(),
            name: "Dev".to_string(),
            handle: "way-too-long-handle".to_string(),
            password: "password123".to_string(),
            password_confirm: "password123".to_string(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("handle"));
    }

    #[test]
    fn missing_body_fields_surface_as_validation_errors() {
        // serde defaults absent fields to "", validation reports them
        let dto: RegisterDto = serde_json::from_str("{}").unwrap();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("handle"));
        assert!(fields.contains_key("password"));
    }
}
