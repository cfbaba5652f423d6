use actix_web::{patch, post, web, HttpRequest, HttpResponse};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    Database,
};
use serde_json::json;
use validator::Validate;

use crate::{
    errors::ApiError,
    middleware::auth::{create_token, require_auth},
    models::user::{LoginDto, RegisterDto, UpdateAccountDto, User, UserPayload, UserRole},
};

#[post("/users/register")]
pub async fn register(
    db: web::Data<Database>,
    user_data: web::Json<RegisterDto>,
) -> Result<HttpResponse, ApiError> {
    // Validate input
    if let Err(errors) = user_data.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }

    let users_collection = db.collection::<User>("users");

    // Check if email already exists
    if users_collection
        .find_one(doc! { "email": &user_data.email }, None)
        .await?
        .is_some()
    {
        return Ok(HttpResponse::BadRequest().json(json!({ "email": "Email already in use" })));
    }

    // Check if handle already exists
    if users_collection
        .find_one(doc! { "handle": &user_data.handle }, None)
        .await?
        .is_some()
    {
        return Ok(
            HttpResponse::BadRequest().json(json!({ "handle": "Handle is already taken" }))
        );
    }

    // Hash password
    let hashed_password = hash(user_data.password.as_bytes(), DEFAULT_COST)?;

    let new_user = User {
        id: Some(ObjectId::new()),
        email: user_data.email.clone(),
        name: user_data.name.clone(),
        handle: user_data.handle.clone(),
        photo: "default.jpg".to_string(),
        role: UserRole::User,
        password: hashed_password,
        following: Vec::new(),
        profile: None,
        password_changed_at: None,
        date: DateTime::from_millis(Utc::now().timestamp_millis()),
    };

    users_collection.insert_one(&new_user, None).await?;

    let token = create_token(&UserPayload::from(new_user))?;
    Ok(HttpResponse::Created().json(json!({ "status": "success", "token": token })))
}

#[post("/users/login")]
pub async fn login(
    db: web::Data<Database>,
    login_data: web::Json<LoginDto>,
) -> Result<HttpResponse, ApiError> {
    // Validate input
    if let Err(errors) = login_data.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }

    let users_collection = db.collection::<User>("users");

    // Find user
    let user = match users_collection
        .find_one(doc! { "email": &login_data.email }, None)
        .await?
    {
        Some(user) => user,
        None => return Ok(HttpResponse::Unauthorized().json("Invalid credentials")),
    };

    // Verify password
    if !verify(&login_data.password, &user.password).unwrap_or(false) {
        return Ok(HttpResponse::Unauthorized().json("Invalid credentials"));
    }

    let token = create_token(&UserPayload::from(user))?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "token": token })))
}

#[patch("/users/currentUser")]
pub async fn update_current_account(
    req: HttpRequest,
    db: web::Data<Database>,
    account_data: web::Json<UpdateAccountDto>,
) -> Result<HttpResponse, ApiError> {
    // Validate input
    if let Err(errors) = account_data.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }

    let auth_user = require_auth(&req)?;
    let users_collection = db.collection::<User>("users");

    // Check if another user holds the requested handle
    if users_collection
        .find_one(
            doc! { "handle": &account_data.handle, "_id": { "$ne": auth_user.id } },
            None,
        )
        .await?
        .is_some()
    {
        return Ok(
            HttpResponse::BadRequest().json(json!({ "handle": "Handle is already taken" }))
        );
    }

    // Check if another user holds the requested email
    if users_collection
        .find_one(
            doc! { "email": &account_data.email, "_id": { "$ne": auth_user.id } },
            None,
        )
        .await?
        .is_some()
    {
        return Ok(HttpResponse::BadRequest().json(json!({ "email": "Email already in use" })));
    }

    users_collection
        .update_one(
            doc! { "_id": auth_user.id },
            doc! { "$set": {
                "email": &account_data.email,
                "name": &account_data.name,
                "handle": &account_data.handle,
            } },
            None,
        )
        .await?;

    // Reissue the token from the re-read user so the cached identity is fresh
    let updated_user = users_collection
        .find_one(doc! { "_id": auth_user.id }, None)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let token = create_token(&UserPayload::from(updated_user))?;

    Ok(HttpResponse::Ok().json(json!({ "status": "success", "token": token })))
}
