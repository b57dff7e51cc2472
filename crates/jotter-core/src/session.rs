//! Current-identity tracking.

use crate::auth::Identity;

/// How the identity moved on a provider notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    SignedIn,
    SignedOut,
    Switched,
    Unchanged,
}

impl SessionChange {
    /// Whether note state belonging to the previous identity must be dropped.
    #[must_use]
    pub const fn clears_notes(self) -> bool {
        matches!(self, Self::SignedOut | Self::Switched)
    }
}

/// At most one authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.uid.as_str())
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Replace the identity with the provider's latest value.
    ///
    /// An identity with the same uid but refreshed profile fields counts as
    /// `Unchanged`; only the stored profile is updated.
    pub fn replace(&mut self, next: Option<Identity>) -> SessionChange {
        let change = match (&self.identity, &next) {
            (None, None) => SessionChange::Unchanged,
            (None, Some(_)) => SessionChange::SignedIn,
            (Some(_), None) => SessionChange::SignedOut,
            (Some(current), Some(next)) if current.uid == next.uid => SessionChange::Unchanged,
            (Some(_), Some(_)) => SessionChange::Switched,
        };
        self.identity = next;
        change
    }
}
