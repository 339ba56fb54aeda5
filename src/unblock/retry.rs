//! Single-retry policy for durations the router script rejects.
//!
//! Some router scripts only accept a handful of durations and answer
//! anything else with an "out of range" style message on stdout. When that
//! happens the unblock is retried once with the nearest commonly accepted
//! value. Equidistant candidates resolve to the lower value, so 45 becomes
//! 30 rather than 60.

/// Durations router scripts are known to accept.
pub const ALTERNATIVE_DURATIONS: [u32; 5] = [5, 10, 15, 30, 60];

/// Lowercase stdout fragments that mean the duration was rejected.
const REJECTION_MARKERS: &[&str] = &[
    "out of range",
    "invalid minutes",
    "invalid duration",
    "value rejected",
];

/// Whether `stdout` reports a rejected duration. Case-insensitive.
pub fn is_duration_rejection(stdout: &str) -> bool {
    let lower = stdout.to_lowercase();
    REJECTION_MARKERS.iter().any(|m| lower.contains(m))
}

/// Nearest alternative to `requested`, excluding `requested` itself.
pub fn alternative_duration(requested: u32) -> Option<u32> {
    ALTERNATIVE_DURATIONS
        .iter()
        .copied()
        .filter(|&candidate| candidate != requested)
        .min_by_key(|&candidate| (candidate.abs_diff(requested), candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod alternative {
        use super::*;

        #[test]
        fn test_tie_resolves_to_lower_value() {
            assert_eq!(alternative_duration(45), Some(30));
            assert_eq!(alternative_duration(20), Some(15));
        }

        #[test]
        fn test_nearest_in_both_directions() {
            assert_eq!(alternative_duration(44), Some(30));
            assert_eq!(alternative_duration(46), Some(60));
            assert_eq!(alternative_duration(1), Some(5));
            assert_eq!(alternative_duration(1440), Some(60));
        }

        #[test]
        fn test_never_returns_requested_value() {
            assert_eq!(alternative_duration(30), Some(15));
            assert_eq!(alternative_duration(5), Some(10));
            assert_eq!(alternative_duration(60), Some(30));
        }
    }

    mod rejection {
        use super::*;

        #[test]
        fn test_detects_markers_case_insensitively() {
            assert!(is_duration_rejection("minutes out of range"));
            assert!(is_duration_rejection("ERROR: Invalid Minutes value"));
            assert!(is_duration_rejection("value rejected by firewall"));
        }

        #[test]
        fn test_other_failures_are_not_rejections() {
            assert!(!is_duration_rejection(""));
            assert!(!is_duration_rejection("sh: /tmp/kidtemp_unblock.sh: not found"));
            assert!(!is_duration_rejection("permission denied"));
        }
    }
}
