//! MTProto session lifecycle: open, authorize, log in, close.

use std::sync::Arc;

use grammers_client::Client;
use grammers_mtsender::{SenderPool, SenderPoolHandle};
use grammers_session::storages::SqliteSession;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info};

use cot_core::{config::Config, domain::UserId, Error, Result};

use crate::grammers::invocation_error;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub session_file: String,
    pub api_id: i32,
    pub api_hash: String,
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            session_file: cfg.session_file.clone(),
            api_id: cfg.api_id,
            api_hash: cfg.api_hash.clone(),
        }
    }
}

/// A connected client plus the background tasks that keep it running.
pub struct TelegramSession {
    client: Client,
    session_file: String,
    api_hash: String,
    _handle: SenderPoolHandle,
    runner: JoinHandle<()>,
    drain: JoinHandle<u64>,
}

impl TelegramSession {
    pub async fn open(cfg: &SessionConfig) -> Result<Self> {
        let session = SqliteSession::open(&cfg.session_file).map_err(|e| {
            Error::Config(format!(
                "session file {} could not be opened: {e}",
                cfg.session_file
            ))
        })?;

        let pool = SenderPool::new(Arc::new(session), cfg.api_id);
        let client = Client::new(&pool);
        let SenderPool {
            runner,
            updates,
            handle,
        } = pool;

        let runner = tokio::spawn(async move {
            runner.run().await;
        });
        let drain = tokio::spawn(drain_updates(updates));
        info!(session_file = %cfg.session_file, "MTProto session opened");

        Ok(Self {
            client,
            session_file: cfg.session_file.clone(),
            api_hash: cfg.api_hash.clone(),
            _handle: handle,
            runner,
            drain,
        })
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Fails with a config error unless the session file holds a signed-in account.
    pub async fn ensure_authorized(&self) -> Result<()> {
        let authorized = self
            .client
            .is_authorized()
            .await
            .map_err(invocation_error)?;
        require_authorized(authorized, &self.session_file)
    }

    /// Sign the session in with a login code. `read_code` is called once the
    /// code has been sent. Two-step verification passwords are not supported.
    pub async fn login<F>(&self, phone: &str, read_code: F) -> Result<UserId>
    where
        F: FnOnce() -> Result<String>,
    {
        if self
            .client
            .is_authorized()
            .await
            .map_err(invocation_error)?
        {
            let me = self.client.get_me().await.map_err(invocation_error)?;
            info!("session already signed in");
            return Ok(UserId(me.raw.id()));
        }

        let token = self
            .client
            .request_login_code(phone, &self.api_hash)
            .await
            .map_err(|e| Error::External(format!("login code request failed: {e}")))?;
        let code = read_code()?;
        let user = self
            .client
            .sign_in(&token, code.trim())
            .await
            .map_err(|e| Error::External(format!("sign in failed: {e}")))?;

        let user_id = UserId(user.raw.id());
        info!(user_id = user_id.0, session_file = %self.session_file, "signed in");
        Ok(user_id)
    }

    /// Stop the network tasks. The session file is persisted as it changes.
    pub async fn close(self) {
        self.runner.abort();
        self.drain.abort();
        match self.drain.await {
            Ok(count) => debug!(count, "update feed drained"),
            Err(e) if e.is_cancelled() => debug!("update feed stopped"),
            Err(e) => debug!("update feed task failed: {e}"),
        }
    }
}

fn require_authorized(authorized: bool, session_file: &str) -> Result<()> {
    if authorized {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "session file {session_file} is not signed in; run `cot login` first"
        )))
    }
}

/// Consume the network update feed. Delivery outcomes come from RPC replies,
/// so nothing here is forwarded.
async fn drain_updates<T>(mut updates: mpsc::UnboundedReceiver<T>) -> u64 {
    let mut count = 0u64;
    while updates.recv().await.is_some() {
        count += 1;
    }
    count
}
