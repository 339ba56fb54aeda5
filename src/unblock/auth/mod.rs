//! Authentication strategies for router SSH sessions.
//!
//! Strategies are tried in order through an [`AuthChain`]. The router
//! session uses key authentication first and falls back to
//! keyboard-interactive, which some embedded SSH daemons require even for
//! accounts that have no password.
//!
//! # Available Strategies
//!
//! - [`KeyAuth`]: Private key file authentication
//! - [`KeyboardInteractiveAuth`]: Keyboard-interactive with blank answers
//!
//! # Example
//!
//! ```ignore
//! let chain = AuthChain::new()
//!     .with_key("/tmp/temp_abc123")
//!     .with_keyboard_interactive();
//!
//! let ok = chain.authenticate(&mut handle, "root").await?;
//! ```

mod chain;
mod key;
mod keyboard;
mod traits;

pub use chain::AuthChain;
pub use key::KeyAuth;
pub use keyboard::KeyboardInteractiveAuth;
pub use traits::AuthStrategy;
