use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpRequest,
};
use chrono::Utc;
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{
    config::get_jwt_secret,
    errors::ApiError,
    models::user::{UserPayload, UserRole},
};

const TOKEN_TTL_SECS: i64 = 24 * 3600;

/// Token claims carry the full user payload, so the client's cached identity
/// (including the profile back-reference) is refreshed with every reissue.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user: UserPayload,
    pub iat: usize,
    pub exp: usize,
}

/// Identity snapshot stored in request extensions by `Authentication`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: ObjectId,
    pub email: String,
    pub role: UserRole,
}

pub fn create_token(user: &UserPayload) -> Result<String, ApiError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.map(|id| id.to_hex()).unwrap_or_default(),
        user: user.clone(),
        iat: now as usize,
        exp: (now + TOKEN_TTL_SECS) as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_jwt_secret().as_ref()),
    )?;
    Ok(token)
}

pub fn decode_token(token: &str) -> Result<TokenData<Claims>, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_jwt_secret().as_ref()),
        &Validation::default(),
    )?;
    Ok(data)
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_header| auth_header.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

pub fn require_auth(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    req.extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))
}

pub fn require_admin(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let user = require_auth(req)?;
    if user.role == UserRole::Admin {
        Ok(user)
    } else {
        Err(ApiError::unauthorized("Admin access required"))
    }
}

/// Decodes the bearer token (when present and valid) and stores the caller's
/// identity in request extensions. Requests without a usable token pass
/// through untouched; protected handlers reject them via `require_auth`.
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticationMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthenticationMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(token) = bearer_token(&req) {
            match decode_token(&token) {
                Ok(data) => {
                    if let Some(id) = data.claims.user.id {
                        req.extensions_mut().insert(AuthenticatedUser {
                            id,
                            email: data.claims.user.email,
                            role: data.claims.user.role,
                        });
                    }
                }
                Err(e) => log::debug!("rejected bearer token: {}", e),
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload(profile: Option<ObjectId>) -> UserPayload {
        UserPayload {
            id: Some(ObjectId::new()),
            email: "dev@example.com".to_string(),
            name: "Dev".to_string(),
            handle: "dev".to_string(),
            photo: "default.jpg".to_string(),
            role: UserRole::User,
            following: Vec::new(),
            profile,
        }
    }

    #[test]
    fn token_round_trips_the_profile_reference() {
        std::env::set_var("JWT_SECRET", "test-secret");
        let profile_id = ObjectId::new();
        let payload = sample_payload(Some(profile_id));

        let token = create_token(&payload).unwrap();
        let decoded = decode_token(&token).unwrap();

        assert_eq!(decoded.claims.user.profile, Some(profile_id));
        assert_eq!(decoded.claims.sub, payload.id.unwrap().to_hex());
        assert_eq!(decoded.claims.user.handle, "dev");
    }

    #[test]
    fn token_without_profile_reference_decodes_to_none() {
        std::env::set_var("JWT_SECRET", "test-secret");
        let token = create_token(&sample_payload(None)).unwrap();
        let decoded = decode_token(&token).unwrap();
        assert_eq!(decoded.claims.user.profile, None);
    }

    #[test]
    fn tampered_token_is_rejected() {
        std::env::set_var("JWT_SECRET", "test-secret");
        let token = create_token(&sample_payload(None)).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(decode_token(&tampered).is_err());
    }
}
