use chrono::{DateTime as ChronoDateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Model;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Profile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Owning user. At most one profile exists per user.
    pub user: ObjectId,
    pub handle: String,
    pub status: String,
    pub skills: Vec<String>,
    pub bio: String,
    pub githubusername: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub social: SocialLinks,
    pub date: DateTime,
}

impl Model for Profile {
    const COLLECTION: &'static str = "profiles";
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SocialLinks {
    pub youtube: String,
    pub twitter: String,
    pub facebook: String,
    pub linkedin: String,
    pub instagram: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Experience {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub from: DateTime,
    pub to: Option<DateTime>,
    /// When true the end date is irrelevant; not schema-enforced.
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Education {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: DateTime,
    pub to: Option<DateTime>,
    pub current: bool,
    pub description: String,
}

impl Profile {
    /// Prepends the entry so iteration order is most-recent-added-first.
    pub fn add_experience(&mut self, entry: Experience) {
        self.experience.insert(0, entry);
    }

    pub fn add_education(&mut self, entry: Education) {
        self.education.insert(0, entry);
    }

    /// Removes the entry whose id matches, leaving the rest in order.
    /// Returns false (and removes nothing) when the id is absent.
    pub fn remove_experience(&mut self, id: &ObjectId) -> bool {
        match self.experience.iter().position(|entry| entry.id == *id) {
            Some(index) => {
                self.experience.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn remove_education(&mut self, id: &ObjectId) -> bool {
        match self.education.iter().position(|entry| entry.id == *id) {
            Some(index) => {
                self.education.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Body of profile create/update requests. Absent optional fields deserialize
/// to empty strings, so an update is always a full overwrite of every field.
#[derive(Debug, Deserialize, Default, Validate)]
#[serde(default)]
pub struct ProfileDto {
    #[validate(length(min = 1, message = "Profile must have a handle"))]
    pub handle: String,
    #[validate(length(min = 1, message = "Profile must have a developer status"))]
    pub status: String,
    #[validate(length(min = 1, message = "Profile must have skills specified"))]
    pub skills: Vec<String>,
    pub bio: String,
    pub githubusername: String,
    pub youtube: String,
    pub twitter: String,
    pub facebook: String,
    pub linkedin: String,
    pub instagram: String,
}

impl ProfileDto {
    fn social(&self) -> SocialLinks {
        SocialLinks {
            youtube: self.youtube.clone(),
            twitter: self.twitter.clone(),
            facebook: self.facebook.clone(),
            linkedin: self.linkedin.clone(),
            instagram: self.instagram.clone(),
        }
    }

    /// Builds a brand-new profile owned by `user`.
    pub fn into_new_profile(&self, user: ObjectId) -> Profile {
        Profile {
            id: Some(ObjectId::new()),
            user,
            handle: self.handle.clone(),
            status: self.status.clone(),
            skills: self.skills.clone(),
            bio: self.bio.clone(),
            githubusername: self.githubusername.clone(),
            experience: Vec::new(),
            education: Vec::new(),
            social: self.social(),
            date: DateTime::from_millis(Utc::now().timestamp_millis()),
        }
    }

    /// Full replace-by-field update: every submitted field overwrites the
    /// stored one, omitted optional fields become empty strings. Identity,
    /// experience, education and the creation date are the only survivors.
    pub fn apply_to(&self, profile: &Profile) -> Profile {
        Profile {
            id: profile.id,
            user: profile.user,
            handle: self.handle.clone(),
            status: self.status.clone(),
            skills: self.skills.clone(),
            bio: self.bio.clone(),
            githubusername: self.githubusername.clone(),
            experience: profile.experience.clone(),
            education: profile.education.clone(),
            social: self.social(),
            date: profile.date,
        }
    }
}

#[derive(Debug, Deserialize, Default, Validate)]
#[serde(default)]
pub struct ExperienceDto {
    #[validate(length(min = 1, message = "Position title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Company name is required"))]
    pub company: String,
    pub location: String,
    #[validate(required(message = "Position start date is required"))]
    pub from: Option<ChronoDateTime<Utc>>,
    pub to: Option<ChronoDateTime<Utc>>,
    pub current: bool,
    pub description: String,
}

impl ExperienceDto {
    /// Consumes the validated body into a stored entry with a fresh id.
    /// Callers must have run `validate` first; a missing start date falls
    /// back to the epoch rather than panicking.
    pub fn into_entry(self) -> Experience {
        Experience {
            id: ObjectId::new(),
            title: self.title,
            company: self.company,
            location: self.location,
            from: self.from.map(bson_date).unwrap_or_else(|| DateTime::from_millis(0)),
            to: self.to.map(bson_date),
            current: self.current,
            description: self.description,
        }
    }
}

#[derive(Debug, Deserialize, Default, Validate)]
#[serde(default)]
pub struct EducationDto {
    #[validate(length(min = 1, message = "School name is required"))]
    pub school: String,
    #[validate(length(min = 1, message = "Degree title is required"))]
    pub degree: String,
    #[validate(length(min = 1, message = "Field of study is required"))]
    pub fieldofstudy: String,
    #[validate(required(message = "Start date is required"))]
    pub from: Option<ChronoDateTime<Utc>>,
    pub to: Option<ChronoDateTime<Utc>>,
    pub current: bool,
    pub description: String,
}

impl EducationDto {
    pub fn into_entry(self) -> Education {
        Education {
            id: ObjectId::new(),
            school: self.school,
            degree: self.degree,
            fieldofstudy: self.fieldofstudy,
            from: self.from.map(bson_date).unwrap_or_else(|| DateTime::from_millis(0)),
            to: self.to.map(bson_date),
            current: self.current,
            description: self.description,
        }
    }
}

fn bson_date(date: ChronoDateTime<Utc>) -> DateTime {
    DateTime::from_millis(date.timestamp_millis())
}
