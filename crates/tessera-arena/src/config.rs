//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for the array arena.
///
/// Controls the initial slot table size and the hard slot limit.
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Number of slots reserved up front.
    ///
    /// Default: 64. Must not exceed `max_slots`.
    pub initial_slots: usize,

    /// Maximum number of simultaneously live arrays.
    ///
    /// Default: 1_048_576. Allocation beyond this limit fails with
    /// [`ArenaError::CapacityExceeded`].
    pub max_slots: u32,
}

impl ArenaConfig {
    /// Default number of pre-reserved slots.
    pub const DEFAULT_INITIAL_SLOTS: usize = 64;

    /// Default hard slot limit.
    pub const DEFAULT_MAX_SLOTS: u32 = 1 << 20;

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.max_slots == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_slots must be at least 1".to_string(),
            });
        }
        if self.initial_slots > self.max_slots as usize {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "initial_slots ({}) exceeds max_slots ({})",
                    self.initial_slots, self.max_slots
                ),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            initial_slots: Self::DEFAULT_INITIAL_SLOTS,
            max_slots: Self::DEFAULT_MAX_SLOTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(ArenaConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_max_slots_rejected() {
        let config = ArenaConfig {
            initial_slots: 0,
            max_slots: 0,
        };
        assert!(matches!(
            config.validate(),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn initial_above_max_rejected() {
        let config = ArenaConfig {
            initial_slots: 10,
            max_slots: 4,
        };
        assert!(config.validate().is_err());
    }
}
