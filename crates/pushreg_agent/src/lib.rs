//! Local registration agent for the push token registry
//!
//! Runs inside the client application. It owns a stable per-install device id,
//! asks the platform for a push address, and keeps the registry in step with
//! login and logout. Notifications are best effort: nothing here blocks the
//! host's authentication flow.
//!
//! # Example
//!
//! ```rust,no_run
//! use pushreg_agent::{LocalRegistrationAgent, MemoryStore, PushAddressProvider, RegistryClient};
//!
//! async fn on_login<P: PushAddressProvider>(provider: P, user_id: &str) {
//!     let client = RegistryClient::new("http://127.0.0.1:8080", 10).unwrap();
//!     let mut agent = LocalRegistrationAgent::new(provider, MemoryStore::new(), client);
//!     if !agent.register_on_login(user_id).await {
//!         // carry on without notifications
//!     }
//! }
//! ```

pub mod agent;
pub mod api;
pub mod error;
pub mod provider;
pub mod store;

pub use agent::{generate_device_id, DeactivateOutcome, LocalRegistrationAgent, RefreshOutcome};
pub use api::RegistryClient;
pub use error::AgentError;
pub use provider::{ProviderError, PushAddressProvider};
pub use store::{CachedRegistration, FileStore, LocalStore, MemoryStore};
