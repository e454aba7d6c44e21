pub mod admin;
pub mod auth;
pub mod channels;
pub mod clock;
pub mod dms;
pub mod error;
pub mod identity;
pub mod mailer;
pub mod messages;
pub mod notifications;
pub mod scheduler;
pub mod standup;
pub mod stats;
pub mod users;
pub mod views;

use std::sync::Arc;

use beans_db::{Data, Database};
use tracing::info;

pub use clock::{ManualClock, SystemClock, TimeProvider};
pub use error::{CoreError, CoreResult};
pub use mailer::{LogMailer, Mailer};
pub use scheduler::Scheduler;

pub struct Config {
    /// Mixed into every session token before hashing.
    pub token_secret: String,
    /// `profileImgUrl` given to newly registered users.
    pub default_profile_img_url: String,
    pub password_params: argon2::Params,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token_secret: "dev-secret-change-me".into(),
            default_profile_img_url: String::new(),
            password_params: argon2::Params::default(),
        }
    }
}

/// Handle to the workspace engines. Cheap to clone; every clone shares the
/// same store, clock and scheduler.
#[derive(Clone)]
pub struct Workspace {
    inner: Arc<WorkspaceInner>,
}

struct WorkspaceInner {
    db: Arc<Database>,
    config: Config,
    clock: Arc<dyn TimeProvider>,
    mailer: Arc<dyn Mailer>,
    scheduler: Scheduler,
}

impl Workspace {
    pub fn new(
        db: Arc<Database>,
        config: Config,
        clock: Arc<dyn TimeProvider>,
        mailer: Arc<dyn Mailer>,
    ) -> CoreResult<Self> {
        let workspace = Self {
            inner: Arc::new(WorkspaceInner {
                db,
                config,
                clock,
                mailer,
                scheduler: Scheduler::new(),
            }),
        };

        // Standups that ran out while the process was down close now.
        workspace.read(|_, _| Ok(()))?;
        info!("Workspace ready");
        Ok(workspace)
    }

    pub fn with_defaults(db: Arc<Database>, config: Config) -> CoreResult<Self> {
        Self::new(db, config, Arc::new(SystemClock), Arc::new(LogMailer))
    }

    pub fn now(&self) -> i64 {
        self.inner.clock.now()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// Drop every entity and cancel all deferred sends.
    pub fn clear(&self) -> CoreResult<()> {
        self.inner.scheduler.cancel_all()?;
        self.inner.db.reset(self.now())?;
        info!("Workspace cleared");
        Ok(())
    }

    pub(crate) fn config(&self) -> &Config {
        &self.inner.config
    }

    pub(crate) fn mailer(&self) -> &dyn Mailer {
        self.inner.mailer.as_ref()
    }

    /// Run a mutation inside one store transaction, after settling any
    /// standups that have run out.
    pub(crate) fn write<T>(&self, f: impl FnOnce(&mut Data, i64) -> CoreResult<T>) -> CoreResult<T> {
        let now = self.now();
        self.inner.db.write(|data| {
            standup::settle_all(data, now);
            f(data, now)
        })
    }

    /// Like `write` for queries: the snapshot is only rewritten when
    /// settling changed something.
    pub(crate) fn read<T>(&self, f: impl FnOnce(&Data, i64) -> CoreResult<T>) -> CoreResult<T> {
        let now = self.now();
        self.inner.db.update(|data| {
            let changed = standup::settle_all(data, now) > 0;
            let out = f(data, now)?;
            Ok((out, changed))
        })
    }
}
