use beans_types::api::{ProfileResponse, UsersResponse};
use beans_types::models::UserId;
use tracing::debug;

use crate::auth::{check_email, check_name};
use crate::error::{CoreError, CoreResult};
use crate::identity::authenticate;
use crate::{Workspace, views};

impl Workspace {
    /// Any user's profile. Removed users show their scrubbed record.
    pub fn user_profile(&self, token: &str, user_id: UserId) -> CoreResult<ProfileResponse> {
        let hash = self.session_hash(token);
        self.read(|data, _| {
            authenticate(data, &hash)?;
            let user = data
                .user(user_id)
                .ok_or_else(|| CoreError::invalid("user does not exist"))?;
            Ok(ProfileResponse {
                user: views::profile(user),
            })
        })
    }

    pub fn users_all(&self, token: &str) -> CoreResult<UsersResponse> {
        let hash = self.session_hash(token);
        self.read(|data, _| {
            authenticate(data, &hash)?;
            let users = data
                .users
                .iter()
                .filter(|u| !u.removed)
                .map(views::profile)
                .collect();
            Ok(UsersResponse { users })
        })
    }

    pub fn set_name(&self, token: &str, name_first: &str, name_last: &str) -> CoreResult<()> {
        check_name(name_first)?;
        check_name(name_last)?;
        let hash = self.session_hash(token);
        self.write(|data, _| {
            let uid = authenticate(data, &hash)?;
            if let Some(user) = data.user_mut(uid) {
                user.name_first = name_first.to_owned();
                user.name_last = name_last.to_owned();
            }
            Ok(())
        })
    }

    pub fn set_email(&self, token: &str, email: &str) -> CoreResult<()> {
        check_email(email)?;
        let hash = self.session_hash(token);
        self.write(|data, _| {
            let uid = authenticate(data, &hash)?;
            if data.user_by_email(email).is_some_and(|u| u.id != uid) {
                return Err(CoreError::invalid("email is already in use"));
            }
            if let Some(user) = data.user_mut(uid) {
                user.email = email.to_owned();
            }
            Ok(())
        })
    }

    pub fn set_handle(&self, token: &str, handle: &str) -> CoreResult<()> {
        let len = handle.chars().count();
        if !(3..=20).contains(&len) {
            return Err(CoreError::invalid("handle must be 3 to 20 characters"));
        }
        if !handle.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::invalid("handle must be alphanumeric"));
        }
        let hash = self.session_hash(token);
        self.write(|data, _| {
            let uid = authenticate(data, &hash)?;
            if data.handle_taken(handle) {
                return Err(CoreError::invalid("handle is already in use"));
            }
            if let Some(user) = data.user_mut(uid) {
                debug!("User {} changed handle {} -> {}", uid, user.handle, handle);
                user.handle = handle.to_owned();
            }
            Ok(())
        })
    }

    /// Point the caller's profile at an already stored image.
    pub fn set_profile_img_url(&self, token: &str, url: &str) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, _| {
            let uid = authenticate(data, &hash)?;
            if let Some(user) = data.user_mut(uid) {
                user.profile_img_url = url.to_owned();
            }
            Ok(())
        })
    }
}
