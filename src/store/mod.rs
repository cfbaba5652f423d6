//! Client-side state container. Mirrors the payload shapes the server
//! returns and implements the pure transitions a native client uses to keep
//! its cached `{user, users, loading}` state in sync.

pub mod alerts;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::{
    post::Post,
    profile::{Education, Experience, Profile},
    user::{UserPayload, UserRole},
};

/// The cached current-user record as returned by the user lookup: the
/// account with its resolved profile, plus the user's posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedUser {
    pub user: CurrentAccount,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAccount {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub email: String,
    pub name: String,
    pub handle: String,
    pub photo: String,
    pub role: UserRole,
    pub following: Vec<ObjectId>,
    /// Resolved profile document, not the bare back-reference.
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Default)]
pub struct UserState {
    pub user: Option<CachedUser>,
    pub users: Option<Vec<UserPayload>>,
    pub loading: bool,
}

#[derive(Debug, Clone)]
pub enum UserAction {
    SetLoad,
    UnsetLoad,
    SetSearchedUser(Option<CachedUser>),
    SetUsers(Vec<UserPayload>),
    /// Replace the cached user's nested profile with the server's copy.
    UpdateProfile(Profile),
    CreatePost(Post),
    UpdatePost(Post),
    DeletePost(ObjectId),
    /// Wholesale replacement with the server-returned list, never a merge.
    UpdateEducation(Vec<Education>),
    UpdateExperience(Vec<Experience>),
}

/// Pure transition: always returns a fresh state value, leaving the input
/// untouched, so referential change detection in the view layer keeps
/// working. Actions that target a user that is not cached are no-ops.
pub fn reduce(state: &UserState, action: UserAction) -> UserState {
    let mut next = state.clone();
    match action {
        UserAction::SetLoad => next.loading = true,
        UserAction::UnsetLoad => next.loading = false,
        UserAction::SetSearchedUser(user) => {
            next.user = user;
            next.loading = false;
        }
        UserAction::SetUsers(users) => next.users = Some(users),
        UserAction::UpdateProfile(profile) => {
            if let Some(cached) = next.user.as_mut() {
                cached.user.profile = Some(profile);
            }
        }
        UserAction::CreatePost(post) => {
            if let Some(cached) = next.user.as_mut() {
                cached.posts.insert(0, post);
            }
        }
        UserAction::UpdatePost(post) => {
            if let Some(cached) = next.user.as_mut() {
                if let Some(index) = cached.posts.iter().position(|p| p.id == post.id) {
                    cached.posts[index] = post;
                }
            }
        }
        UserAction::DeletePost(id) => {
            if let Some(cached) = next.user.as_mut() {
                cached.posts.retain(|post| post.id != Some(id));
            }
        }
        UserAction::UpdateEducation(education) => {
            if let Some(profile) = nested_profile(&mut next) {
                profile.education = education;
            }
        }
        UserAction::UpdateExperience(experience) => {
            if let Some(profile) = nested_profile(&mut next) {
                profile.experience = experience;
            }
        }
    }
    next
}

fn nested_profile(state: &mut UserState) -> Option<&mut Profile> {
    state.user.as_mut().and_then(|cached| cached.user.profile.as_mut())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::ProfileDto;
    use chrono::Utc;
    use mongodb::bson::DateTime;

    fn sample_profile() -> Profile {
        ProfileDto {
            handle: "dev".to_string(),
            status: "Student".to_string(),
            skills: vec!["Go".to_string()],
            ..Default::default()
        }
        .into_new_profile(ObjectId::new())
    }

    fn sample_post(text: &str) -> Post {
        Post {
            id: Some(ObjectId::new()),
            user: ObjectId::new(),
            name: "Dev".to_string(),
            text: text.to_string(),
            likes: Vec::new(),
            date: DateTime::from_millis(Utc::now().timestamp_millis()),
        }
    }

    fn sample_experience(title: &str) -> Experience {
        Experience {
            id: ObjectId::new(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: String::new(),
            from: DateTime::from_millis(0),
            to: None,
            current: false,
            description: String::new(),
        }
    }

    fn cached_state() -> UserState {
        let mut profile = sample_profile();
        profile.experience = vec![sample_experience("Old")];
        UserState {
            user: Some(CachedUser {
                user: CurrentAccount {
                    id: Some(ObjectId::new()),
                    email: "dev@example.com".to_string(),
                    name: "Dev".to_string(),
                    handle: "dev".to_string(),
                    photo: "default.jpg".to_string(),
                    role: UserRole::User,
                    following: Vec::new(),
                    profile: Some(profile),
                },
                posts: vec![sample_post("first"), sample_post("second")],
            }),
            users: None,
            loading: false,
        }
    }

    #[test]
    fn load_actions_only_toggle_the_flag() {
        let state = cached_state();
        let loading = reduce(&state, UserAction::SetLoad);
        assert!(loading.loading);
        assert!(loading.user.is_some());

        let done = reduce(&loading, UserAction::UnsetLoad);
        assert!(!done.loading);
    }

    #[test]
    fn set_searched_user_replaces_wholesale_and_clears_loading() {
        let mut state = cached_state();
        state.loading = true;
        let next = reduce(&state, UserAction::SetSearchedUser(None));
        assert!(next.user.is_none());
        assert!(!next.loading);
    }

    #[test]
    fn update_profile_swaps_the_nested_profile() {
        let state = cached_state();
        let mut replacement = sample_profile();
        replacement.status = "Senior".to_string();

        let next = reduce(&state, UserAction::UpdateProfile(replacement));

        let profile = next.user.unwrap().user.profile.unwrap();
        assert_eq!(profile.status, "Senior");
        // the input state is untouched
        let old = state.user.unwrap().user.profile.unwrap();
        assert_eq!(old.status, "Student");
    }

    #[test]
    fn create_post_prepends() {
        let state = cached_state();
        let next = reduce(&state, UserAction::CreatePost(sample_post("newest")));
        let posts = next.user.unwrap().posts;
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].text, "newest");
        assert_eq!(posts[1].text, "first");
    }

    #[test]
    fn update_post_replaces_the_matching_one() {
        let state = cached_state();
        let mut edited = state.user.as_ref().unwrap().posts[1].clone();
        edited.text = "edited".to_string();

        let next = reduce(&state, UserAction::UpdatePost(edited));
        let posts = next.user.unwrap().posts;
        assert_eq!(posts[0].text, "first");
        assert_eq!(posts[1].text, "edited");
    }

    #[test]
    fn delete_post_filters_by_id() {
        let state = cached_state();
        let target = state.user.as_ref().unwrap().posts[0].id.unwrap();

        let next = reduce(&state, UserAction::DeletePost(target));
        let posts = next.user.unwrap().posts;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].text, "second");
    }

    #[test]
    fn update_experience_replaces_the_list_entirely() {
        let state = cached_state();
        let next = reduce(
            &state,
            UserAction::UpdateExperience(vec![sample_experience("X")]),
        );

        let profile = next.user.unwrap().user.profile.unwrap();
        assert_eq!(profile.experience.len(), 1);
        assert_eq!(profile.experience[0].title, "X");
    }

    #[test]
    fn profile_actions_without_a_cached_user_are_no_ops() {
        let state = UserState::default();
        let next = reduce(&state, UserAction::UpdateEducation(Vec::new()));
        assert!(next.user.is_none());
    }
}
