//! Keyboard-interactive SSH authentication.

use async_trait::async_trait;
use russh::client::{self, KeyboardInteractiveAuthResponse};
use tracing::debug;

use crate::unblock::remote::handler::RouterClientHandler;

use super::traits::AuthStrategy;

/// Maximum number of prompt rounds before giving up.
const MAX_PROMPT_ROUNDS: usize = 3;

/// Keyboard-interactive fallback. No secret is configured for it, so every
/// prompt is answered with an empty string; this succeeds on routers that
/// accept the account without a password and fails fast elsewhere.
#[derive(Debug, Default)]
pub struct KeyboardInteractiveAuth;

impl KeyboardInteractiveAuth {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuthStrategy for KeyboardInteractiveAuth {
    async fn authenticate(
        &self,
        handle: &mut client::Handle<RouterClientHandler>,
        username: &str,
    ) -> Result<bool, String> {
        let mut response = handle
            .authenticate_keyboard_interactive_start(username, None::<String>)
            .await
            .map_err(|e| format!("Keyboard-interactive start failed: {}", e))?;

        for round in 0..MAX_PROMPT_ROUNDS {
            match response {
                KeyboardInteractiveAuthResponse::Success => return Ok(true),
                KeyboardInteractiveAuthResponse::Failure { .. } => return Ok(false),
                KeyboardInteractiveAuthResponse::InfoRequest { prompts, .. } => {
                    debug!(
                        "Keyboard-interactive round {}: {} prompt(s)",
                        round + 1,
                        prompts.len()
                    );
                    let answers = vec![String::new(); prompts.len()];
                    response = handle
                        .authenticate_keyboard_interactive_respond(answers)
                        .await
                        .map_err(|e| format!("Keyboard-interactive respond failed: {}", e))?;
                }
            }
        }

        Ok(matches!(response, KeyboardInteractiveAuthResponse::Success))
    }

    fn name(&self) -> &'static str {
        "keyboard-interactive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_interactive_name() {
        assert_eq!(KeyboardInteractiveAuth::new().name(), "keyboard-interactive");
    }
}
