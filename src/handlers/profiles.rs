use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use mongodb::{
    bson::{doc, oid::ObjectId},
    Database,
};
use serde_json::json;
use url::Url;
use validator::Validate;

use crate::{
    errors::ApiError,
    handlers::factory,
    middleware::auth::{create_token, require_admin, require_auth},
    models::{
        profile::{EducationDto, ExperienceDto, Profile, ProfileDto},
        user::{User, UserPayload},
    },
};

async fn find_current_profile(db: &Database, user_id: &ObjectId) -> Result<Profile, ApiError> {
    db.collection::<Profile>("profiles")
        .find_one(doc! { "user": *user_id }, None)
        .await?
        .ok_or_else(|| ApiError::not_found("No profile exists for this user"))
}

async fn persist_profile(db: &Database, profile: &Profile) -> Result<(), ApiError> {
    db.collection::<Profile>("profiles")
        .replace_one(doc! { "_id": profile.id }, profile, None)
        .await?;
    Ok(())
}

/// A handle conflicts only when an existing profile holds it AND that
/// profile belongs to someone else; reusing your own handle is fine.
fn handle_taken_by_other(existing: Option<&Profile>, owner: &ObjectId) -> bool {
    existing.map(|profile| profile.user != *owner).unwrap_or(false)
}

#[post("/profiles/currentUser")]
pub async fn create_current_user_profile(
    req: HttpRequest,
    db: web::Data<Database>,
    profile_data: web::Json<ProfileDto>,
) -> Result<HttpResponse, ApiError> {
    // Validate input
    if let Err(errors) = profile_data.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }

    let auth_user = require_auth(&req)?;

    let users_collection = db.collection::<User>("users");
    let profiles_collection = db.collection::<Profile>("profiles");

    let user = users_collection
        .find_one(doc! { "_id": auth_user.id }, None)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    // Check if the user has already created a profile
    if let Some(profile_ref) = user.profile {
        if profiles_collection
            .find_one(doc! { "_id": profile_ref }, None)
            .await?
            .is_some()
        {
            return Ok(HttpResponse::BadRequest()
                .json(json!({ "alreadyCreated": "User has already created a profile" })));
        }
    }

    // Check if the handle is already taken
    if profiles_collection
        .find_one(doc! { "handle": &profile_data.handle }, None)
        .await?
        .is_some()
    {
        return Ok(
            HttpResponse::BadRequest().json(json!({ "handle": "Handle is already taken" }))
        );
    }

    let new_profile = profile_data.into_new_profile(auth_user.id);
    profiles_collection.insert_one(&new_profile, None).await?;

    // Write the back-reference onto the owning user. Not atomic with the
    // insert above: a crash between the two writes leaves a profile whose
    // user does not point back at it.
    users_collection
        .update_one(
            doc! { "_id": auth_user.id },
            doc! { "$set": { "profile": new_profile.id } },
            None,
        )
        .await?;

    // Reissue the token from the re-read user so the client's cached
    // identity reflects the new profile linkage without a separate fetch.
    let updated_user = users_collection
        .find_one(doc! { "_id": auth_user.id }, None)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let token = create_token(&UserPayload::from(updated_user))?;

    Ok(HttpResponse::Created().json(json!({ "status": "success", "token": token })))
}

#[patch("/profiles/currentUser")]
pub async fn update_current_user_profile(
    req: HttpRequest,
    db: web::Data<Database>,
    profile_data: web::Json<ProfileDto>,
) -> Result<HttpResponse, ApiError> {
    // Validate input
    if let Err(errors) = profile_data.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }

    let auth_user = require_auth(&req)?;

    let profiles_collection = db.collection::<Profile>("profiles");
    let profile = find_current_profile(&db, &auth_user.id).await?;

    // Check if the handle has been taken by another user
    let handle_check = profiles_collection
        .find_one(doc! { "handle": &profile_data.handle }, None)
        .await?;
    if handle_taken_by_other(handle_check.as_ref(), &auth_user.id) {
        return Ok(
            HttpResponse::BadRequest().json(json!({ "handle": "Handle is already taken" }))
        );
    }

    // Full overwrite: omitted optional fields reset to empty strings
    let updated = profile_data.apply_to(&profile);
    persist_profile(&db, &updated).await?;

    // Re-read so the response is the stored document
    let updated_profile = find_current_profile(&db, &auth_user.id).await?;
    Ok(HttpResponse::Ok().json(updated_profile))
}

#[post("/profiles/experience")]
pub async fn add_experience(
    req: HttpRequest,
    db: web::Data<Database>,
    entry: web::Json<ExperienceDto>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = entry.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }

    let auth_user = require_auth(&req)?;
    let mut profile = find_current_profile(&db, &auth_user.id).await?;

    profile.add_experience(entry.into_inner().into_entry());
    persist_profile(&db, &profile).await?;

    Ok(HttpResponse::Ok().json(profile))
}

#[delete("/profiles/experience/{id}")]
pub async fn delete_experience(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let auth_user = require_auth(&req)?;
    let mut profile = find_current_profile(&db, &auth_user.id).await?;

    // An unknown id removes nothing and still reports success
    let removed = ObjectId::parse_str(id.as_str())
        .map(|entry_id| profile.remove_experience(&entry_id))
        .unwrap_or(false);
    if !removed {
        log::debug!("delete experience: no entry matched id {}", id);
    }
    persist_profile(&db, &profile).await?;

    Ok(HttpResponse::Ok().json(profile))
}

#[post("/profiles/education")]
pub async fn add_education(
    req: HttpRequest,
    db: web::Data<Database>,
    entry: web::Json<EducationDto>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = entry.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }

    let auth_user = require_auth(&req)?;
    let mut profile = find_current_profile(&db, &auth_user.id).await?;

    profile.add_education(entry.into_inner().into_entry());
    persist_profile(&db, &profile).await?;

    Ok(HttpResponse::Ok().json(profile))
}

#[delete("/profiles/education/{id}")]
pub async fn delete_education(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let auth_user = require_auth(&req)?;
    let mut profile = find_current_profile(&db, &auth_user.id).await?;

    let removed = ObjectId::parse_str(id.as_str())
        .map(|entry_id| profile.remove_education(&entry_id))
        .unwrap_or(false);
    if !removed {
        log::debug!("delete education: no entry matched id {}", id);
    }
    persist_profile(&db, &profile).await?;

    Ok(HttpResponse::Ok().json(profile))
}

#[get("/profiles")]
pub async fn get_all_profiles(db: web::Data<Database>) -> Result<HttpResponse, ApiError> {
    let profiles = factory::get_all::<Profile>(&db).await?;
    Ok(HttpResponse::Ok().json(profiles))
}

#[get("/profiles/profile/{id}")]
pub async fn get_profile_by_id(
    db: web::Data<Database>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let object_id = match ObjectId::parse_str(id.as_str()) {
        Ok(id) => id,
        Err(_) => return Ok(HttpResponse::BadRequest().json("Invalid profile ID")),
    };

    let profile = factory::get_one::<Profile>(&db, &object_id)
        .await?
        .ok_or_else(|| ApiError::not_found("No profile found with that ID"))?;
    Ok(HttpResponse::Ok().json(profile))
}

#[patch("/profiles/profile/{id}")]
pub async fn update_profile_by_id(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
    fields: web::Json<serde_json::Value>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req)?;

    let object_id = match ObjectId::parse_str(id.as_str()) {
        Ok(id) => id,
        Err(_) => return Ok(HttpResponse::BadRequest().json("Invalid profile ID")),
    };

    let updated = factory::update_one::<Profile>(&db, &object_id, fields.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("No profile found with that ID"))?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/profiles/profile/{id}")]
pub async fn delete_profile_by_id(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req)?;

    let object_id = match ObjectId::parse_str(id.as_str()) {
        Ok(id) => id,
        Err(_) => return Ok(HttpResponse::BadRequest().json("Invalid profile ID")),
    };

    if !factory::delete_one::<Profile>(&db, &object_id).await? {
        return Err(ApiError::not_found("No profile found with that ID"));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[get("/profiles/github/{username}")]
pub async fn get_github_repos(username: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let not_found =
        || HttpResponse::NotFound().json(json!({ "nogithub": "No GitHub profile found" }));

    let mut url =
        match Url::parse(&format!("https://api.github.com/users/{}/repos", username)) {
            Ok(url) => url,
            Err(_) => return Ok(not_found()),
        };
    url.query_pairs_mut()
        .append_pair("per_page", "5")
        .append_pair("sort", "created:asc");

    let response = reqwest::Client::new()
        .get(url)
        .header(reqwest::header::USER_AGENT, "devconnect-backend")
        .send()
        .await;

    let response = match response {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            log::debug!("github lookup for {} returned {}", username, response.status());
            return Ok(not_found());
        }
        Err(_) => return Ok(not_found()),
    };

    match response.json::<serde_json::Value>().await {
        Ok(repos) => Ok(HttpResponse::Ok().json(repos)),
        Err(_) => Ok(not_found()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_owned_by(user: ObjectId) -> Profile {
        ProfileDto {
            handle: "abc".to_string(),
            status: "Student".to_string(),
            skills: vec!["Go".to_string()],
            ..Default::default()
        }
        .into_new_profile(user)
    }

    #[test]
    fn reusing_your_own_handle_is_not_a_conflict() {
        let owner = ObjectId::new();
        let existing = profile_owned_by(owner);
        assert!(!handle_taken_by_other(Some(&existing), &owner));
    }

    #[test]
    fn anothers_handle_is_a_conflict() {
        let existing = profile_owned_by(ObjectId::new());
        assert!(handle_taken_by_other(Some(&existing), &ObjectId::new()));
    }

    #[test]
    fn free_handle_is_not_a_conflict() {
        assert!(!handle_taken_by_other(None, &ObjectId::new()));
    }
}
