//! Builder for unblock confirmation messages.

/// Builds the confirmation shown after a successful unblock.
///
/// # Example
///
/// ```ignore
/// let message = UnblockMessageBuilder::new("68:54:5A:96:69:BE", 45)
///     .with_effective_duration(30)
///     .build();
/// ```
pub struct UnblockMessageBuilder {
    mac_address: String,
    requested_minutes: u32,
    effective_minutes: Option<u32>,
}

impl UnblockMessageBuilder {
    pub fn new(mac_address: impl Into<String>, requested_minutes: u32) -> Self {
        Self {
            mac_address: mac_address.into(),
            requested_minutes,
            effective_minutes: None,
        }
    }

    /// Set the duration actually granted, if it differs from the request.
    pub fn with_effective_duration(mut self, minutes: u32) -> Self {
        self.effective_minutes = Some(minutes);
        self
    }

    pub fn build(&self) -> String {
        match self.effective_minutes {
            Some(effective) if effective != self.requested_minutes => format!(
                "Device {} unblocked for {} minute(s) ({} minute(s) were requested but not accepted by the router)",
                self.mac_address, effective, self.requested_minutes
            ),
            _ => format!(
                "Device {} unblocked for {} minute(s)",
                self.mac_address, self.requested_minutes
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_confirmation() {
        let message = UnblockMessageBuilder::new("68:54:5A:96:69:BE", 15).build();
        assert_eq!(message, "Device 68:54:5A:96:69:BE unblocked for 15 minute(s)");
    }

    #[test]
    fn test_adjusted_confirmation_mentions_both_durations() {
        let message = UnblockMessageBuilder::new("68:54:5A:96:69:BE", 45)
            .with_effective_duration(30)
            .build();
        assert!(message.contains("unblocked for 30 minute(s)"));
        assert!(message.contains("45 minute(s) were requested"));
    }

    #[test]
    fn test_same_effective_duration_is_plain() {
        let message = UnblockMessageBuilder::new("AA:BB:CC:DD:EE:FF", 10)
            .with_effective_duration(10)
            .build();
        assert_eq!(message, "Device AA:BB:CC:DD:EE:FF unblocked for 10 minute(s)");
    }
}
