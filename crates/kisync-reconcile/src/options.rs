use kisync_core::Validation;

/// Run mode of a reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Compute decisions without mutating the remote side.
    pub dry_run: bool,
    /// Verify every member sub-project exists first. Implies `dry_run` and
    /// `strict`.
    pub sanity_check: bool,
    /// Fail on unresolvable references instead of dropping them.
    pub strict: bool,
}

impl SyncOptions {
    #[must_use]
    pub const fn applies_changes(&self) -> bool {
        !(self.dry_run || self.sanity_check)
    }

    #[must_use]
    pub const fn validation(&self) -> Validation {
        if self.strict || self.sanity_check {
            Validation::Strict
        } else {
            Validation::Lenient
        }
    }
}
