use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use beans_db::Data;
use beans_types::api::{AuthResponse, RegisterRequest};
use beans_types::models::{Permission, User, UserId, UserStats};
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::{info, warn};
use validator::ValidateEmail;

use crate::error::{CoreError, CoreResult};
use crate::identity::{authenticate, new_token};
use crate::Workspace;

const MIN_PASSWORD_CHARS: usize = 6;
const MAX_NAME_CHARS: usize = 50;
const MAX_HANDLE_CHARS: usize = 20;
const RESET_CODE_LEN: usize = 12;

pub(crate) fn check_email(email: &str) -> CoreResult<()> {
    if !email.validate_email() {
        return Err(CoreError::invalid("invalid email"));
    }
    Ok(())
}

pub(crate) fn check_name(name: &str) -> CoreResult<()> {
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_CHARS {
        return Err(CoreError::invalid("names must be 1 to 50 characters"));
    }
    Ok(())
}

fn check_password(password: &str) -> CoreResult<()> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(CoreError::invalid("password must be at least 6 characters"));
    }
    Ok(())
}

/// Lowercased alphanumeric first+last name, cut to 20 characters, with a
/// counter appended while the result is taken.
fn derive_handle(data: &Data, name_first: &str, name_last: &str) -> String {
    let base: String = name_first
        .chars()
        .chain(name_last.chars())
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .take(MAX_HANDLE_CHARS)
        .collect();
    if !data.handle_taken(&base) {
        return base;
    }
    let mut n = 0u32;
    loop {
        let candidate = format!("{}{}", base, n);
        if !data.handle_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn reset_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_CODE_LEN)
        .map(char::from)
        .collect()
}

impl Workspace {
    fn hash_password(&self, password: &str) -> CoreResult<String> {
        let argon2 = Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            self.config().password_params.clone(),
        );
        let salt = SaltString::generate(&mut OsRng);
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e).into())
    }

    /// Start a session for `user_id`, returning the raw token.
    fn open_session(&self, data: &mut Data, user_id: UserId) -> CoreResult<String> {
        let token = new_token();
        let hash = self.session_hash(&token);
        let user = data
            .user_mut(user_id)
            .ok_or_else(|| CoreError::invalid("user does not exist"))?;
        user.sessions.push(hash);
        Ok(token)
    }

    pub fn register(&self, req: &RegisterRequest) -> CoreResult<AuthResponse> {
        check_email(&req.email)?;
        check_password(&req.password)?;
        check_name(&req.name_first)?;
        check_name(&req.name_last)?;
        let password_hash = self.hash_password(&req.password)?;

        self.write(|data, now| {
            if data.user_by_email(&req.email).is_some() {
                return Err(CoreError::invalid("email is already registered"));
            }

            let id = data.users.len() as UserId;
            // The first account owns the workspace.
            let permission = if id == 0 {
                Permission::Owner
            } else {
                Permission::Member
            };
            let handle = derive_handle(data, &req.name_first, &req.name_last);
            data.users.push(User {
                id,
                handle: handle.clone(),
                email: req.email.clone(),
                name_first: req.name_first.clone(),
                name_last: req.name_last.clone(),
                password_hash,
                permission,
                removed: false,
                sessions: Vec::new(),
                notifications: Vec::new(),
                stats: UserStats::new(now),
                profile_img_url: self.config().default_profile_img_url.clone(),
                reset_code: None,
                time_created: now,
            });

            let token = self.open_session(data, id)?;
            info!("Registered user {} ({})", id, handle);
            Ok(AuthResponse {
                token,
                auth_user_id: id,
            })
        })
    }

    pub fn login(&self, email: &str, password: &str) -> CoreResult<AuthResponse> {
        let (id, stored) = self.read(|data, _| {
            data.user_by_email(email)
                .map(|u| (u.id, u.password_hash.clone()))
                .ok_or_else(|| CoreError::invalid("email is not registered"))
        })?;

        let parsed = PasswordHash::new(&stored)
            .map_err(|e| anyhow::anyhow!("stored password hash is malformed: {}", e))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| CoreError::invalid("incorrect password"))?;

        self.write(|data, _| {
            let token = self.open_session(data, id)?;
            Ok(AuthResponse {
                token,
                auth_user_id: id,
            })
        })
    }

    pub fn logout(&self, token: &str) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, _| {
            let uid = authenticate(data, &hash)?;
            if let Some(user) = data.user_mut(uid) {
                user.sessions.retain(|s| *s != hash);
            }
            Ok(())
        })
    }

    /// Mail a reset code to `email` and end all of that user's sessions.
    /// Succeeds whether or not the email is registered.
    pub fn request_password_reset(&self, email: &str) -> CoreResult<()> {
        let code = reset_code();
        let known = self.write(|data, _| {
            let Some(id) = data.user_by_email(email).map(|u| u.id) else {
                return Ok(false);
            };
            if let Some(user) = data.user_mut(id) {
                user.reset_code = Some(code.clone());
                user.sessions.clear();
            }
            Ok(true)
        })?;

        if known {
            if let Err(e) = self.mailer().send_reset_code(email, &code) {
                warn!("Failed to deliver reset code to {}: {}", email, e);
            }
        }
        Ok(())
    }

    pub fn reset_password(&self, code: &str, new_password: &str) -> CoreResult<()> {
        check_password(new_password)?;
        let password_hash = self.hash_password(new_password)?;

        self.write(|data, _| {
            let user = data
                .users
                .iter_mut()
                .find(|u| !u.removed && u.reset_code.as_deref() == Some(code))
                .ok_or_else(|| CoreError::invalid("invalid reset code"))?;
            user.password_hash = password_hash;
            user.reset_code = None;
            info!("Password reset for user {}", user.id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_handles(handles: &[&str]) -> Data {
        let mut data = Data::empty(0);
        for (i, h) in handles.iter().enumerate() {
            data.users.push(User {
                id: i as UserId,
                handle: (*h).into(),
                email: String::new(),
                name_first: String::new(),
                name_last: String::new(),
                password_hash: String::new(),
                permission: Permission::Member,
                removed: false,
                sessions: Vec::new(),
                notifications: Vec::new(),
                stats: UserStats::new(0),
                profile_img_url: String::new(),
                reset_code: None,
                time_created: 0,
            });
        }
        data
    }

    #[test]
    fn handle_is_lowercase_alphanumeric() {
        let data = Data::empty(0);
        assert_eq!(derive_handle(&data, "Mary-Jane", "O'Neil"), "maryjaneoneil");
    }

    #[test]
    fn handle_is_cut_before_the_counter() {
        let data = with_handles(&["abcdefghijklmnopqrst"]);
        assert_eq!(
            derive_handle(&data, "abcdefghij", "klmnopqrstuvwxyz"),
            "abcdefghijklmnopqrst0"
        );
    }

    #[test]
    fn counter_skips_taken_suffixes() {
        let data = with_handles(&["annlee", "annlee0"]);
        assert_eq!(derive_handle(&data, "Ann", "Lee"), "annlee1");
    }

    #[test]
    fn email_and_password_rules() {
        assert!(check_email("a@example.com").is_ok());
        assert!(check_email("not an email").is_err());
        assert!(check_password("12345").is_err());
        assert!(check_password("123456").is_ok());
        assert!(check_name("").is_err());
        assert!(check_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn reset_codes_are_alphanumeric() {
        let code = reset_code();
        assert_eq!(code.len(), RESET_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
