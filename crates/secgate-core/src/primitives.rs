//! # Primitives
//!
//! Hardcoded defaults for the simulated collaborators and the demo binding.
//!
//! Every value here can be overridden through the app configuration except
//! the protected card list, which is the fixed payload of the simulated
//! data service.

/// Simulated latency of a login attempt, in milliseconds.
pub const DEFAULT_LOGIN_DELAY_MS: u64 = 2000;

/// Simulated latency of the protected data fetch, in milliseconds.
pub const DEFAULT_FETCH_DELAY_MS: u64 = 2000;

/// Fixed payload delivered by the simulated card service, in order.
pub const PROTECTED_CARDS: [&str; 2] = ["1221 3113 3113 3133", "3233 3223 3234 4333"];

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum size of a configuration file (64 KB).
pub const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// Upper bound for any configured simulated delay (one minute).
///
/// Delays above this are rejected so a typo cannot park a request forever.
pub const MAX_SIMULATED_DELAY_MS: u64 = 60_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_cards_are_fixed() {
        assert_eq!(
            PROTECTED_CARDS,
            ["1221 3113 3113 3133", "3233 3223 3234 4333"]
        );
    }

    #[test]
    fn default_delays_within_bounds() {
        assert!(DEFAULT_LOGIN_DELAY_MS <= MAX_SIMULATED_DELAY_MS);
        assert!(DEFAULT_FETCH_DELAY_MS <= MAX_SIMULATED_DELAY_MS);
    }
}
