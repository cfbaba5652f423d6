use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::Model;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    /// Author name, denormalized so posts render without a user lookup.
    pub name: String,
    pub text: String,
    pub likes: Vec<ObjectId>,
    pub date: DateTime,
}

impl Model for Post {
    const COLLECTION: &'static str = "posts";
}
