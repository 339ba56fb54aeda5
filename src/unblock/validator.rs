//! Input validation for unblock requests and router configuration.

use std::net::Ipv4Addr;

use crate::unblock::error::UnblockError;

/// Minimum accepted unblock duration in minutes.
pub const MIN_DURATION_MINUTES: i64 = 1;

/// Maximum accepted unblock duration in minutes (24 hours).
pub const MAX_DURATION_MINUTES: i64 = 1440;

/// Placeholder replaced by the normalized MAC address.
pub const MAC_PLACEHOLDER: &str = "{MAC}";

/// Placeholder replaced by the duration in minutes.
pub const MINUTES_PLACEHOLDER: &str = "{MINUTES}";

/// Check that `mac` is exactly six colon-separated hex pairs.
///
/// Letter case is not significant; any other separator or length is rejected.
pub fn validate_mac_address(mac: &str) -> bool {
    let bytes = mac.as_bytes();
    if bytes.len() != 17 {
        return false;
    }

    bytes.iter().enumerate().all(|(i, b)| {
        if i % 3 == 2 {
            *b == b':'
        } else {
            b.is_ascii_hexdigit()
        }
    })
}

/// Validate and uppercase a MAC address.
pub fn normalize_mac_address(mac: &str) -> Result<String, UnblockError> {
    if !validate_mac_address(mac) {
        return Err(UnblockError::InvalidMacAddress(mac.to_string()));
    }
    Ok(mac.to_ascii_uppercase())
}

pub fn validate_duration(minutes: i64) -> bool {
    (MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes)
}

/// Dotted-quad IPv4 check used for the router address.
pub fn validate_ipv4(address: &str) -> bool {
    address.parse::<Ipv4Addr>().is_ok()
}

/// Check that a command template carries both placeholders.
pub fn validate_command_template(template: &str) -> Result<(), UnblockError> {
    let missing: Vec<&str> = [MAC_PLACEHOLDER, MINUTES_PLACEHOLDER]
        .into_iter()
        .filter(|p| !template.contains(p))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(UnblockError::IncompleteConfiguration(format!(
            "command template is missing {}",
            missing.join(" and ")
        )))
    }
}

/// Substitute `{MAC}` and `{MINUTES}` in `template`, each exactly once.
pub fn render_command_template(
    template: &str,
    mac: &str,
    minutes: u32,
) -> Result<String, UnblockError> {
    validate_command_template(template)?;

    Ok(template
        .replacen(MAC_PLACEHOLDER, mac, 1)
        .replacen(MINUTES_PLACEHOLDER, &minutes.to_string(), 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod mac_address {
        use super::*;

        #[test]
        fn test_accepts_canonical_forms() {
            assert!(validate_mac_address("68:54:5A:96:69:BE"));
            assert!(validate_mac_address("68:54:5a:96:69:be"));
            assert!(validate_mac_address("00:00:00:00:00:00"));
            assert!(validate_mac_address("aA:bB:cC:dD:eE:fF"));
        }

        #[test]
        fn test_rejects_other_separators() {
            assert!(!validate_mac_address("68-54-5A-96-69-BE"));
            assert!(!validate_mac_address("68.54.5A.96.69.BE"));
            assert!(!validate_mac_address("6854.5A96.69BE"));
            assert!(!validate_mac_address("68:54:5A-96:69:BE"));
        }

        #[test]
        fn test_rejects_wrong_length() {
            assert!(!validate_mac_address(""));
            assert!(!validate_mac_address("68:54:5A:96:69"));
            assert!(!validate_mac_address("68:54:5A:96:69:BE:01"));
            assert!(!validate_mac_address("68:54:5A:96:69:B"));
            assert!(!validate_mac_address("68:54:5A:96:69:BE "));
        }

        #[test]
        fn test_rejects_non_hex() {
            assert!(!validate_mac_address("GG:54:5A:96:69:BE"));
            assert!(!validate_mac_address("68:54:5A:96:69:ZZ"));
        }

        #[test]
        fn test_normalize_uppercases() {
            assert_eq!(
                normalize_mac_address("68:54:5a:96:69:be").unwrap(),
                "68:54:5A:96:69:BE"
            );
        }

        #[test]
        fn test_normalize_is_idempotent() {
            for mac in ["68:54:5a:96:69:be", "AA:bb:CC:dd:EE:ff", "01:23:45:67:89:AB"] {
                let once = normalize_mac_address(mac).unwrap();
                let twice = normalize_mac_address(&once).unwrap();
                assert_eq!(once, twice);
                assert_eq!(once, once.to_uppercase());
            }
        }

        #[test]
        fn test_normalize_rejects_invalid() {
            let err = normalize_mac_address("68-54-5A-96-69-BE").unwrap_err();
            assert!(matches!(err, UnblockError::InvalidMacAddress(_)));
        }
    }

    mod duration {
        use super::*;

        #[test]
        fn test_boundaries() {
            assert!(!validate_duration(0));
            assert!(validate_duration(1));
            assert!(validate_duration(1440));
            assert!(!validate_duration(1441));
        }

        #[test]
        fn test_negative_and_extreme_values() {
            assert!(!validate_duration(-1));
            assert!(!validate_duration(i64::MIN));
            assert!(!validate_duration(i64::MAX));
        }
    }

    mod ipv4 {
        use super::*;

        #[test]
        fn test_accepts_dotted_quad() {
            assert!(validate_ipv4("192.168.1.1"));
            assert!(validate_ipv4("10.0.0.254"));
        }

        #[test]
        fn test_rejects_invalid() {
            assert!(!validate_ipv4("256.1.1.1"));
            assert!(!validate_ipv4("192.168.1"));
            assert!(!validate_ipv4("router.local"));
            assert!(!validate_ipv4(""));
        }
    }

    mod template {
        use super::*;

        #[test]
        fn test_renders_both_placeholders() {
            let rendered = render_command_template(
                "SSH_ORIGINAL_COMMAND=\"unblock {MAC} {MINUTES}\" sh script.sh",
                "AA:BB:CC:DD:EE:FF",
                5,
            )
            .unwrap();
            assert_eq!(
                rendered,
                "SSH_ORIGINAL_COMMAND=\"unblock AA:BB:CC:DD:EE:FF 5\" sh script.sh"
            );
        }

        #[test]
        fn test_substitutes_only_first_occurrence() {
            let rendered =
                render_command_template("{MAC} {MINUTES} {MAC} {MINUTES}", "AA:BB:CC:DD:EE:FF", 5)
                    .unwrap();
            assert_eq!(rendered, "AA:BB:CC:DD:EE:FF 5 {MAC} {MINUTES}");
        }

        #[test]
        fn test_missing_placeholder_is_incomplete_configuration() {
            let err = render_command_template("unblock {MAC}", "AA:BB:CC:DD:EE:FF", 5).unwrap_err();
            assert!(matches!(err, UnblockError::IncompleteConfiguration(_)));
            assert!(err.to_string().contains("{MINUTES}"));
        }

        #[test]
        fn test_both_missing_listed() {
            let err = validate_command_template("sh script.sh").unwrap_err();
            let msg = err.to_string();
            assert!(msg.contains("{MAC}"));
            assert!(msg.contains("{MINUTES}"));
        }
    }
}
