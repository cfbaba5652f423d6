use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Database,
};
use serde_json::json;

use crate::{
    errors::ApiError,
    middleware::auth::require_auth,
    models::{post::Post, profile::Profile, user::{User, UserPayload}},
};

#[get("/users")]
pub async fn get_users(db: web::Data<Database>) -> Result<HttpResponse, ApiError> {
    let cursor = db.collection::<User>("users").find(None, None).await?;
    let users: Vec<User> = cursor.try_collect().await?;

    // Strip password hashes before responding
    let payloads: Vec<UserPayload> = users.into_iter().map(UserPayload::from).collect();
    Ok(HttpResponse::Ok().json(payloads))
}

/// Public user lookup. The profile and posts relations are not stored on the
/// user document; they are resolved here with explicit queries against their
/// own collections.
#[get("/users/{handle}")]
pub async fn get_user(
    db: web::Data<Database>,
    handle: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user = db
        .collection::<User>("users")
        .find_one(doc! { "handle": handle.as_str() }, None)
        .await?
        .ok_or_else(|| ApiError::not_found("No user found with that handle"))?;

    let user_id = user
        .id
        .ok_or_else(|| ApiError::not_found("No user found with that handle"))?;

    let profile = db
        .collection::<Profile>("profiles")
        .find_one(doc! { "user": user_id }, None)
        .await?;

    let cursor = db
        .collection::<Post>("posts")
        .find(doc! { "user": user_id }, None)
        .await?;
    let posts: Vec<Post> = cursor.try_collect().await?;

    // Nest the resolved profile inside the account payload, matching the
    // shape the client caches
    let mut account = serde_json::to_value(UserPayload::from(user))?;
    if let serde_json::Value::Object(ref mut map) = account {
        map.insert("profile".to_string(), serde_json::to_value(&profile)?);
    }

    Ok(HttpResponse::Ok().json(json!({ "user": account, "posts": posts })))
}

#[post("/users/follow/{id}")]
pub async fn follow_user(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let auth_user = require_auth(&req)?;

    let target_id = match ObjectId::parse_str(id.as_str()) {
        Ok(id) => id,
        Err(_) => return Ok(HttpResponse::BadRequest().json("Invalid user ID")),
    };

    if target_id == auth_user.id {
        return Ok(
            HttpResponse::BadRequest().json(json!({ "follow": "You cannot follow yourself" }))
        );
    }

    let users_collection = db.collection::<User>("users");
    if users_collection
        .find_one(doc! { "_id": target_id }, None)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("No user found with that ID"));
    }

    // $addToSet keeps the operation idempotent
    users_collection
        .update_one(
            doc! { "_id": auth_user.id },
            doc! { "$addToSet": { "following": target_id } },
            None,
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}

#[delete("/users/follow/{id}")]
pub async fn unfollow_user(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let auth_user = require_auth(&req)?;

    let target_id = match ObjectId::parse_str(id.as_str()) {
        Ok(id) => id,
        Err(_) => return Ok(HttpResponse::BadRequest().json("Invalid user ID")),
    };

    db.collection::<User>("users")
        .update_one(
            doc! { "_id": auth_user.id },
            doc! { "$pull": { "following": target_id } },
            None,
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}
