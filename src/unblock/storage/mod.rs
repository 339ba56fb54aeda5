//! Credential storage.
//!
//! The orchestrator only depends on the [`CredentialStore`] trait and loads
//! credentials fresh at the start of every operation. The bundled
//! implementation keeps the router configuration in a `DashMap` keyed by
//! the configuration names `router_ip`, `ssh_user`, `ssh_key` and
//! `ssh_command_template`.

mod memory;
mod traits;

pub use memory::{
    COMMAND_TEMPLATE_KEY, MemoryCredentialStore, ROUTER_IP_KEY, SSH_KEY_KEY, SSH_USER_KEY,
};
pub use traits::CredentialStore;
