use crate::{ScopeError, ScopeResult};

/// Id allocation settings of a scope.
///
/// Replicas that create objects concurrently partition the id space by
/// stride: participant `p` of `n` only allocates ids `i` with `i % n == p`.
/// The default is a single participant that allocates every id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeConfig {
    /// Index of this replica, `0..total_participants`.
    pub participant: u64,
    /// Number of replicas allocating ids.
    pub total_participants: u64,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            participant: 0,
            total_participants: 1,
        }
    }
}

impl ScopeConfig {
    /// Stride allocation for replica `participant` of `total_participants`.
    pub fn striped(participant: u64, total_participants: u64) -> ScopeResult<Self> {
        let config = Self {
            participant,
            total_participants,
        };
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> ScopeResult<()> {
        if self.total_participants == 0 {
            return Err(ScopeError::InvalidConfig(
                "total_participants must be at least 1".into(),
            ));
        }
        if self.participant >= self.total_participants {
            return Err(ScopeError::InvalidConfig(format!(
                "participant {} out of range for {} participants",
                self.participant, self.total_participants
            )));
        }
        Ok(())
    }

    /// Whether this replica may allocate `counter`.
    pub(crate) fn owns(&self, counter: u64) -> bool {
        counter % self.total_participants == self.participant
    }
}
