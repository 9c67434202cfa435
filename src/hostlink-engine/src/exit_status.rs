//! Process exit codes (sysexits.h numbering) and the mapping from an
//! invocation's outcome to one of them.

use hostlink_features::ValidationConflict;

use crate::result::ActivationRecord;

/// Success.
pub const EXIT_OK: i32 = 0;
/// Generic failure: registration/authentication failed, or an activation failed.
pub const EXIT_FAILURE: i32 = 1;
/// Invalid invocation: unknown feature, bad credential combination, dependency conflict.
pub const EXIT_USAGE: i32 = 64;
/// Unsupported output format.
pub const EXIT_DATA_ERR: i32 = 65;
/// Internal software error.
pub const EXIT_SOFTWARE: i32 = 70;
/// Malformed configuration or invalid dependency graph.
pub const EXIT_CONFIG: i32 = 78;

/// Outcome of the primary registration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The pipeline stopped before registering.
    NotAttempted,
    Registered,
    Failed(String),
}

impl RegistrationOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, RegistrationOutcome::Registered)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RegistrationOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Map the outcome of a `connect` invocation to an exit code.
///
/// Conflicts win over everything else. Without registration nothing else
/// matters. Only records of enabled features can fail the invocation.
pub fn map_exit_code(
    conflicts: &[ValidationConflict],
    records: &[ActivationRecord],
    registration: &RegistrationOutcome,
) -> i32 {
    if !conflicts.is_empty() {
        return EXIT_USAGE;
    }
    if !registration.is_registered() {
        return EXIT_FAILURE;
    }
    if records.iter().any(|r| r.enabled && !r.successful) {
        return EXIT_FAILURE;
    }
    EXIT_OK
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(feature: &str, enabled: bool, successful: bool) -> ActivationRecord {
        ActivationRecord {
            feature_id: feature.to_string(),
            enabled,
            successful,
            error: (!successful).then(|| "boom".to_string()),
        }
    }

    #[test]
    fn test_conflicts_are_usage_errors() {
        let conflicts = vec![ValidationConflict::new("remote-management", "content")];
        assert_eq!(
            map_exit_code(&conflicts, &[], &RegistrationOutcome::NotAttempted),
            EXIT_USAGE
        );
    }

    #[test]
    fn test_failed_registration_is_generic_failure() {
        let outcome = RegistrationOutcome::Failed("invalid credentials".to_string());
        let code = map_exit_code(&[], &[], &outcome);
        assert_eq!(code, EXIT_FAILURE);
        assert_ne!(code, EXIT_USAGE);
    }

    #[test]
    fn test_full_success() {
        let records = vec![
            record("content", true, true),
            record("analytics", true, true),
            record("remote-management", false, true),
        ];
        assert_eq!(
            map_exit_code(&[], &records, &RegistrationOutcome::Registered),
            EXIT_OK
        );
    }

    #[test]
    fn test_failed_enabled_activation_is_nonzero() {
        let records = vec![
            record("content", true, true),
            record("analytics", true, true),
            record("remote-management", true, false),
        ];
        assert_eq!(
            map_exit_code(&[], &records, &RegistrationOutcome::Registered),
            EXIT_FAILURE
        );
    }

    #[test]
    fn test_disabled_feature_failure_does_not_fail_invocation() {
        let records = vec![record("content", false, false)];
        assert_eq!(
            map_exit_code(&[], &records, &RegistrationOutcome::Registered),
            EXIT_OK
        );
    }
}
