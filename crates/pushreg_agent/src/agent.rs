//! Local registration agent
//!
//! Keeps this install's server-side registration in step with login and logout.
//! The agent is driven from one lifecycle sequence at a time, so it holds its
//! state in plain fields and takes `&mut self`.
//!
//! Failures never propagate into the host's login/logout flow: the boolean entry
//! points ([`register_device`](LocalRegistrationAgent::register_device),
//! [`register_on_login`](LocalRegistrationAgent::register_on_login)) log and
//! return `false`, and deactivation folds "already gone" into success.

use chrono::Utc;
use pushreg_common::{DeviceType, RegisterDeviceRequest};
use pushreg_config::AgentConfig;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::RegistryClient;
use crate::error::AgentError;
use crate::provider::PushAddressProvider;
use crate::store::{
    load_registration, save_registration, CachedRegistration, FileStore, LocalStore,
    DEVICE_ID_KEY, REGISTRATION_KEY,
};

/// Result of a deactivation the host can ignore either way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeactivateOutcome {
    /// The registry flipped an active registration to inactive
    Deactivated,
    /// There was nothing to deactivate, or it was already inactive
    AlreadyInDesiredState,
}

/// Result of a refresh tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cached registration matched; no network call was made
    Unchanged,
    /// The registry was called and returned this registration id
    Registered(i64),
}

/// Builds a fresh device id: platform tag, creation time in ms, random suffix.
pub fn generate_device_id(device_type: DeviceType) -> String {
    format!(
        "{}-{}-{}",
        device_type,
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

pub struct LocalRegistrationAgent<P, S> {
    provider: P,
    store: S,
    client: RegistryClient,
    device_id: Option<String>,
    push_address: Option<String>,
}

impl<P: PushAddressProvider> LocalRegistrationAgent<P, FileStore> {
    /// Agent persisting to `agent.store_path`, talking to `agent.registry_url`.
    pub fn from_config(provider: P, config: &AgentConfig) -> Result<Self, AgentError> {
        let store_path = config
            .store_path
            .as_deref()
            .ok_or_else(|| AgentError::Config("agent.store_path is not set".to_string()))?;
        let client = RegistryClient::from_config(config)?;
        Ok(Self::new(provider, FileStore::new(store_path), client))
    }
}

impl<P: PushAddressProvider, S: LocalStore> LocalRegistrationAgent<P, S> {
    pub fn new(provider: P, store: S, client: RegistryClient) -> Self {
        Self {
            provider,
            store,
            client,
            device_id: None,
            push_address: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn push_address(&self) -> Option<&str> {
        self.push_address.as_deref()
    }

    /// Returns this install's device id, creating and persisting one if needed.
    ///
    /// If storage fails the id is kept for the life of the process only.
    pub fn resolve_device_id(&mut self) -> String {
        if let Some(id) = &self.device_id {
            return id.clone();
        }

        let id = match self.store.get(DEVICE_ID_KEY) {
            Ok(Some(id)) if !id.trim().is_empty() => {
                debug!("Loaded persisted device id {}", id);
                id
            }
            Ok(_) => {
                let id = generate_device_id(self.provider.device_type());
                match self.store.set(DEVICE_ID_KEY, id.clone()) {
                    Ok(()) => info!("Created device id {}", id),
                    Err(e) => warn!(error = %e, "Device id {} will not survive a restart", id),
                }
                id
            }
            Err(e) => {
                warn!(error = %e, "Failed to read device id, using a process-lifetime id");
                generate_device_id(self.provider.device_type())
            }
        };

        self.device_id = Some(id.clone());
        id
    }

    /// Asks the platform for the current push address and remembers it.
    pub async fn acquire_push_address(&mut self) -> Result<String, AgentError> {
        match self.provider.acquire_push_address().await {
            Ok(address) => {
                self.push_address = Some(address.clone());
                Ok(address)
            }
            Err(e) => {
                self.push_address = None;
                Err(e.into())
            }
        }
    }

    pub async fn are_notifications_enabled(&self) -> bool {
        self.provider.notifications_enabled().await
    }

    pub async fn request_permissions(&self) -> bool {
        self.provider.request_permissions().await
    }

    /// Registers the resolved identity and acquired address for `user_id`.
    ///
    /// Fails without a network call if either precondition is missing.
    pub async fn try_register_device(&mut self, user_id: &str) -> Result<i64, AgentError> {
        let device_id = self.device_id.clone().ok_or(AgentError::MissingIdentity)?;
        let push_address = self
            .push_address
            .clone()
            .ok_or(AgentError::MissingPushAddress)?;
        let device_type = self.provider.device_type();

        let request = RegisterDeviceRequest {
            user_id: user_id.to_string(),
            push_address: push_address.clone(),
            device_id,
            device_type: device_type.to_string(),
        };
        let registration_id = self.client.register_device(&request).await?;

        let cached = CachedRegistration {
            user_id: user_id.to_string(),
            push_address,
            device_type,
        };
        if let Err(e) = save_registration(&mut self.store, &cached) {
            warn!(error = %e, "Registered but failed to cache the registration");
        }

        info!("Registered device as registration {}", registration_id);
        Ok(registration_id)
    }

    /// Boolean form of [`try_register_device`](Self::try_register_device).
    pub async fn register_device(&mut self, user_id: &str) -> bool {
        match self.try_register_device(user_id).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Device registration failed");
                false
            }
        }
    }

    /// Full login-time cycle: resolve identity, acquire address, register.
    pub async fn register_on_login(&mut self, user_id: &str) -> bool {
        self.resolve_device_id();
        if let Err(e) = self.acquire_push_address().await {
            warn!(error = %e, "Push address unavailable, notifications disabled");
            return false;
        }
        self.register_device(user_id).await
    }

    /// Periodic or app-start tick.
    ///
    /// Re-acquires the push address and registers only when it, the platform or
    /// the user differs from the cached registration. Repeated ticks with nothing
    /// changed make no network calls.
    pub async fn refresh_registration(
        &mut self,
        user_id: &str,
    ) -> Result<RefreshOutcome, AgentError> {
        self.resolve_device_id();
        let push_address = self.acquire_push_address().await?;

        let current = CachedRegistration {
            user_id: user_id.to_string(),
            push_address,
            device_type: self.provider.device_type(),
        };
        let cached = load_registration(&self.store).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read cached registration");
            None
        });

        if cached.as_ref() == Some(&current) {
            debug!("Registration unchanged, skipping refresh");
            return Ok(RefreshOutcome::Unchanged);
        }

        let registration_id = self.try_register_device(user_id).await?;
        Ok(RefreshOutcome::Registered(registration_id))
    }

    /// Logout-time revocation of this install for `user_id`.
    ///
    /// `NOT_FOUND` and `ALREADY_INACTIVE` from the registry are reported as
    /// [`DeactivateOutcome::AlreadyInDesiredState`], never as errors.
    pub async fn deactivate_device(
        &mut self,
        user_id: &str,
    ) -> Result<DeactivateOutcome, AgentError> {
        let device_id = self.resolve_device_id();

        let outcome = match self.client.deactivate_device(user_id, &device_id).await {
            Ok(()) => DeactivateOutcome::Deactivated,
            Err(e) if e.is_already_achieved() => {
                debug!("Device already unregistered: {}", e);
                DeactivateOutcome::AlreadyInDesiredState
            }
            Err(e) => {
                warn!(error = %e, "Device deactivation failed");
                return Err(e);
            }
        };

        if let Err(e) = self.store.remove(REGISTRATION_KEY) {
            warn!(error = %e, "Failed to clear cached registration");
        }
        Ok(outcome)
    }
}
