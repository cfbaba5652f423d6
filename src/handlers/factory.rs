//! Generic CRUD helpers for routes with no entity-specific rules, shared by
//! the public read endpoints and the admin-restricted update/delete ones.

use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Database,
};
use serde::de::DeserializeOwned;

use crate::{errors::ApiError, models::Model};

pub async fn get_all<T>(db: &Database) -> Result<Vec<T>, ApiError>
where
    T: Model + DeserializeOwned + Unpin + Send + Sync,
{
    let cursor = db.collection::<T>(T::COLLECTION).find(None, None).await?;
    Ok(cursor.try_collect().await?)
}

pub async fn get_one<T>(db: &Database, id: &ObjectId) -> Result<Option<T>, ApiError>
where
    T: Model + DeserializeOwned + Unpin + Send + Sync,
{
    let document = db
        .collection::<T>(T::COLLECTION)
        .find_one(doc! { "_id": *id }, None)
        .await?;
    Ok(document)
}

/// `$set`s the submitted fields and returns the post-update document.
pub async fn update_one<T>(
    db: &Database,
    id: &ObjectId,
    fields: serde_json::Value,
) -> Result<Option<T>, ApiError>
where
    T: Model + DeserializeOwned + Unpin + Send + Sync,
{
    let fields = mongodb::bson::to_document(&fields)?;
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let updated = db
        .collection::<T>(T::COLLECTION)
        .find_one_and_update(doc! { "_id": *id }, doc! { "$set": fields }, options)
        .await?;
    Ok(updated)
}

/// Returns true when a document was actually deleted.
pub async fn delete_one<T>(db: &Database, id: &ObjectId) -> Result<bool, ApiError>
where
    T: Model + DeserializeOwned + Unpin + Send + Sync,
{
    let result = db
        .collection::<T>(T::COLLECTION)
        .delete_one(doc! { "_id": *id }, None)
        .await?;
    Ok(result.deleted_count == 1)
}
