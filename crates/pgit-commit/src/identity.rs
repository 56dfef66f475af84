//! Identity inputs and the provider of ambient identity and time.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, FixedOffset, Local, TimeZone};
use pgit_types::PersonIdent;

use crate::config::RepoConfig;

/// Which identity of a commit is being resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Author,
    Committer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Author => f.write_str("author"),
            Self::Committer => f.write_str("committer"),
        }
    }
}

/// What a caller said about an author or committer.
///
/// A full identity and separate name/email parts are mutually exclusive:
/// whichever was set last wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum IdentityInput {
    #[default]
    Unset,
    NameOnly(String),
    EmailOnly(String),
    NameEmail { name: String, email: String },
    Full(PersonIdent),
}

impl IdentityInput {
    /// Set the name part, keeping any email part. Discards a full identity.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        match self {
            Self::EmailOnly(email) | Self::NameEmail { email, .. } => {
                Self::NameEmail { name, email }
            }
            Self::Unset | Self::NameOnly(_) | Self::Full(_) => Self::NameOnly(name),
        }
    }

    /// Set the email part, keeping any name part. Discards a full identity.
    pub fn with_email(self, email: impl Into<String>) -> Self {
        let email = email.into();
        match self {
            Self::NameOnly(name) | Self::NameEmail { name, .. } => {
                Self::NameEmail { name, email }
            }
            Self::Unset | Self::EmailOnly(_) | Self::Full(_) => Self::EmailOnly(email),
        }
    }
}

impl From<PersonIdent> for IdentityInput {
    fn from(ident: PersonIdent) -> Self {
        Self::Full(ident)
    }
}

/// Source of the default committer and of the current time.
pub trait IdentityProvider: Send + Sync {
    /// Default `(name, email)`, used when a request names no committer.
    fn ambient_identity(&self) -> Option<(String, String)>;

    /// Timestamp for identities created during a commit.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Identity from the `[user]` section of a [`RepoConfig`], time from the
/// system clock.
#[derive(Clone, Debug, Default)]
pub struct ConfigIdentityProvider {
    user: Option<(String, String)>,
}

impl ConfigIdentityProvider {
    pub fn new(config: &RepoConfig) -> Self {
        let user = match (&config.user.name, &config.user.email) {
            (Some(name), Some(email)) => Some((name.clone(), email.clone())),
            _ => None,
        };
        Self { user }
    }
}

impl IdentityProvider for ConfigIdentityProvider {
    fn ambient_identity(&self) -> Option<(String, String)> {
        self.user.clone()
    }

    fn now(&self) -> DateTime<FixedOffset> {
        DateTime::<FixedOffset>::from(Local::now())
    }
}

/// Deterministic provider: a fixed identity and a clock that advances one
/// second per reading.
#[derive(Debug)]
pub struct FixedIdentityProvider {
    user: Option<(String, String)>,
    offset: FixedOffset,
    seconds: AtomicI64,
}

impl FixedIdentityProvider {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        start: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            user: Some((name.into(), email.into())),
            offset: *start.offset(),
            seconds: AtomicI64::new(start.timestamp()),
        }
    }

    /// A provider with a clock but no default identity.
    pub fn anonymous(start: DateTime<FixedOffset>) -> Self {
        Self {
            user: None,
            offset: *start.offset(),
            seconds: AtomicI64::new(start.timestamp()),
        }
    }
}

impl IdentityProvider for FixedIdentityProvider {
    fn ambient_identity(&self) -> Option<(String, String)> {
        self.user.clone()
    }

    fn now(&self) -> DateTime<FixedOffset> {
        let seconds = self.seconds.fetch_add(1, Ordering::Relaxed);
        self.offset
            .timestamp_opt(seconds, 0)
            .single()
            .unwrap_or_else(|| DateTime::<FixedOffset>::from(Local::now()))
    }
}
