//! Signed-in identity and its persistence.
//!
//! The identity always goes to the short-lived store. With remember-me it
//! is also written, together with a flag, to the long-lived store; without
//! it both long-lived keys are cleared so a previous remembered user does
//! not come back on the next start.

use std::sync::Arc;

use parking_lot::RwLock;

use marquee_api::{AuthContext, AuthUser, CatalogGateway};
use marquee_core::event_log::{ControllerEvent, SharedEventLog};
use marquee_core::models::{SessionIdentity, UserProfile, UserSettings};
use marquee_core::storage::KeyValueStore;

use crate::error::RuntimeError;

pub const IDENTITY_KEY: &str = "session.identity";
pub const PERSISTENT_IDENTITY_KEY: &str = "session.identity.persistent";
pub const REMEMBER_KEY: &str = "session.remember";

pub struct SessionStore<G> {
    gateway: Arc<G>,
    short_lived: Arc<dyn KeyValueStore>,
    long_lived: Arc<dyn KeyValueStore>,
    current: RwLock<Option<SessionIdentity>>,
    events: SharedEventLog,
}

impl<G: CatalogGateway> SessionStore<G> {
    pub fn new(
        gateway: Arc<G>,
        short_lived: Arc<dyn KeyValueStore>,
        long_lived: Arc<dyn KeyValueStore>,
        events: SharedEventLog,
    ) -> Self {
        Self {
            gateway,
            short_lived,
            long_lived,
            current: RwLock::new(None),
            events,
        }
    }

    pub fn current(&self) -> Option<SessionIdentity> {
        self.current.read().clone()
    }

    /// The current identity, or `NotAuthenticated`.
    pub fn require(&self) -> Result<SessionIdentity, RuntimeError> {
        self.current().ok_or(RuntimeError::NotAuthenticated)
    }

    /// Pick up an identity saved by an earlier run and re-apply it to the gateway.
    pub fn restore(&self) -> Option<SessionIdentity> {
        let identity = read_identity(self.short_lived.as_ref(), IDENTITY_KEY).or_else(|| {
            let remembered = self
                .long_lived
                .get(REMEMBER_KEY)
                .unwrap_or_else(|e| {
                    tracing::warn!("Failed to read remember flag: {e}");
                    None
                })
                .is_some_and(|v| v == "true");
            if remembered {
                read_identity(self.long_lived.as_ref(), PERSISTENT_IDENTITY_KEY)
            } else {
                None
            }
        })?;

        tracing::info!(email = %identity.email, "session restored");
        self.activate(identity.clone());
        Some(identity)
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<SessionIdentity, RuntimeError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(RuntimeError::Validation(
                "email and password are required".into(),
            ));
        }

        let user = self.gateway.login(email, password).await?;
        self.establish(user, remember)
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: &str,
        remember: bool,
    ) -> Result<SessionIdentity, RuntimeError> {
        let email = email.trim();
        let name = name.trim();
        if email.is_empty() || password.is_empty() || name.is_empty() {
            return Err(RuntimeError::Validation(
                "name, email and password are required".into(),
            ));
        }

        let user = self.gateway.signup(email, password, name).await?;
        self.establish(user, remember)
    }

    /// Forget the identity everywhere. Storage failures are reported after
    /// the in-memory state and the gateway have been cleared.
    pub fn logout(&self) -> Result<(), RuntimeError> {
        let previous = self.current.write().take();
        self.gateway.set_auth_context(None);

        let mut first_error = None;
        for (store, key) in [
            (&self.short_lived, IDENTITY_KEY),
            (&self.long_lived, PERSISTENT_IDENTITY_KEY),
            (&self.long_lived, REMEMBER_KEY),
        ] {
            if let Err(e) = store.remove(key) {
                tracing::warn!(key, "Failed to clear session key: {e}");
                first_error.get_or_insert(e);
            }
        }

        if let Some(identity) = previous {
            tracing::info!(email = %identity.email, "signed out");
            self.events
                .lock()
                .push(ControllerEvent::SessionChanged { email: None });
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Delete the account server-side, then sign out.
    pub async fn delete_account(&self, password: &str) -> Result<(), RuntimeError> {
        self.require()?;
        if password.is_empty() {
            return Err(RuntimeError::Validation("password is required".into()));
        }
        self.gateway.delete_user_account(password).await?;
        self.logout()
    }

    pub async fn profile(&self) -> Result<UserProfile, RuntimeError> {
        self.require()?;
        Ok(self.gateway.get_user_profile().await?)
    }

    pub async fn settings(&self) -> Result<UserSettings, RuntimeError> {
        self.require()?;
        Ok(self.gateway.get_user_settings().await?)
    }

    pub async fn update_settings(
        &self,
        settings: &UserSettings,
    ) -> Result<UserSettings, RuntimeError> {
        self.require()?;
        let saved = self.gateway.update_user_settings(settings).await?;

        let renamed = saved
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        if let Some(name) = renamed {
            self.rename(name)?;
        }
        Ok(saved)
    }

    fn establish(&self, user: AuthUser, remember: bool) -> Result<SessionIdentity, RuntimeError> {
        let identity = SessionIdentity {
            user_id: user.user_id,
            email: user.email,
            display_name: user.display_name,
            is_admin: user.is_admin,
        };
        let record = serde_json::to_string(&identity)
            .map_err(|e| RuntimeError::Storage(e.to_string()))?;

        self.short_lived.set(IDENTITY_KEY, &record)?;
        if remember {
            self.long_lived.set(PERSISTENT_IDENTITY_KEY, &record)?;
            self.long_lived.set(REMEMBER_KEY, "true")?;
        } else {
            self.long_lived.remove(PERSISTENT_IDENTITY_KEY)?;
            self.long_lived.remove(REMEMBER_KEY)?;
        }

        tracing::info!(email = %identity.email, remember, "signed in");
        self.activate(identity.clone());
        Ok(identity)
    }

    fn activate(&self, identity: SessionIdentity) {
        self.gateway.set_auth_context(Some(AuthContext {
            user_id: identity.user_id,
            email: identity.email.clone(),
        }));
        self.events.lock().push(ControllerEvent::SessionChanged {
            email: Some(identity.email.clone()),
        });
        *self.current.write() = Some(identity);
    }

    /// Write a new display name through to every store holding the identity.
    fn rename(&self, name: &str) -> Result<(), RuntimeError> {
        let identity = {
            let mut current = self.current.write();
            let Some(identity) = current.as_mut() else {
                return Ok(());
            };
            identity.display_name = name.to_string();
            identity.clone()
        };
        let record = serde_json::to_string(&identity)
            .map_err(|e| RuntimeError::Storage(e.to_string()))?;

        if self.short_lived.get(IDENTITY_KEY)?.is_some() {
            self.short_lived.set(IDENTITY_KEY, &record)?;
        }
        if self.long_lived.get(PERSISTENT_IDENTITY_KEY)?.is_some() {
            self.long_lived.set(PERSISTENT_IDENTITY_KEY, &record)?;
        }
        Ok(())
    }
}

/// Read and decode an identity record. A corrupt record is removed.
fn read_identity(store: &dyn KeyValueStore, key: &str) -> Option<SessionIdentity> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(key, "Failed to read session: {e}");
            return None;
        }
    };
    match serde_json::from_str::<SessionIdentity>(&raw) {
        Ok(identity) if !identity.email.trim().is_empty() => Some(identity),
        Ok(_) | Err(_) => {
            tracing::warn!(key, "Discarding corrupt session record");
            if let Err(e) = store.remove(key) {
                tracing::warn!(key, "Failed to remove corrupt session record: {e}");
            }
            None
        }
    }
}
