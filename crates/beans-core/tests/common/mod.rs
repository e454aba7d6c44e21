#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use beans_core::{Config, ManualClock, Mailer, Workspace};
use beans_db::Database;
use beans_types::api::{AuthResponse, RegisterRequest};

pub const START: i64 = 1_700_000_000;

#[derive(Default)]
pub struct Outbox(pub Mutex<Vec<(String, String)>>);

impl Mailer for Outbox {
    fn send_reset_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        self.0.lock().unwrap().push((email.to_owned(), code.to_owned()));
        Ok(())
    }
}

pub struct Harness {
    pub ws: Workspace,
    pub clock: ManualClock,
    pub outbox: Arc<Outbox>,
}

pub fn harness() -> Harness {
    let clock = ManualClock::starting_at(START);
    let outbox = Arc::new(Outbox::default());
    let config = Config {
        token_secret: "test-secret".into(),
        default_profile_img_url: "http://localhost/imgurl/default.jpg".into(),
        password_params: argon2::Params::new(8, 1, 1, None).unwrap(),
    };
    let ws = Workspace::new(
        Arc::new(Database::in_memory()),
        config,
        Arc::new(clock.clone()),
        outbox.clone(),
    )
    .unwrap();
    Harness { ws, clock, outbox }
}

impl Harness {
    /// Register `First Last` with a derived email.
    pub fn user(&self, first: &str, last: &str) -> AuthResponse {
        self.ws
            .register(&RegisterRequest {
                email: format!("{}.{}@example.com", first, last).to_lowercase(),
                password: "password1".into(),
                name_first: first.into(),
                name_last: last.into(),
            })
            .unwrap()
    }

    pub fn channel(&self, owner: &AuthResponse, name: &str) -> u32 {
        self.ws.channels_create(&owner.token, name, true).unwrap().channel_id
    }

    pub fn bodies(&self, reader: &AuthResponse, channel_id: u32) -> Vec<String> {
        self.ws
            .channel_messages(&reader.token, channel_id, 0)
            .unwrap()
            .messages
            .into_iter()
            .map(|m| m.message)
            .collect()
    }
}
