//! Remote session client for the router.
//!
//! One session is opened per command: connect, authenticate, run, tear down.
//! The [`Connector`] and [`RemoteSession`] traits are the seam the
//! orchestrator depends on; [`SshConnector`] is the russh implementation.

pub mod client;
pub mod handler;
pub mod traits;

pub use client::{SshConnector, build_client_config};
pub use traits::{Connector, RemoteSession, SessionTarget};
