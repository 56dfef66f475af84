use std::fmt;

use chrono::{DateTime, FixedOffset, Local, TimeZone};

use crate::error::TypeError;

/// An author or committer: name, email and a zoned timestamp.
///
/// Rendered in commit headers as `Name <email> <unix-seconds> <+hhmm>`.
/// Names and emails may not contain `<`, `>` or line breaks since those
/// delimit the header fields.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonIdent {
    name: String,
    email: String,
    when: DateTime<FixedOffset>,
}

impl PersonIdent {
    /// Create an identity with an explicit timestamp.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        when: DateTime<FixedOffset>,
    ) -> Result<Self, TypeError> {
        let name = name.into();
        let email = email.into();
        validate_field("name", &name)?;
        validate_field("email", &email)?;
        Ok(Self { name, email, when })
    }

    /// Create an identity stamped with the local wall-clock time.
    pub fn now(name: impl Into<String>, email: impl Into<String>) -> Result<Self, TypeError> {
        Self::new(name, email, DateTime::<FixedOffset>::from(Local::now()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn when(&self) -> DateTime<FixedOffset> {
        self.when
    }

    /// Copy of this identity with a different name.
    pub fn with_name(&self, name: impl Into<String>) -> Result<Self, TypeError> {
        Self::new(name, self.email.clone(), self.when)
    }

    /// Copy of this identity with a different email.
    pub fn with_email(&self, email: impl Into<String>) -> Result<Self, TypeError> {
        Self::new(self.name.clone(), email, self.when)
    }

    /// Render in Git header form.
    pub fn to_git_string(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.when.timestamp(),
            format_offset(self.when.offset())
        )
    }

    /// Parse a Git header value (`Name <email> seconds +hhmm`).
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let invalid = |reason: &str| TypeError::InvalidIdentity(format!("{reason}: {s:?}"));

        let lt = s.find('<').ok_or_else(|| invalid("missing '<'"))?;
        let gt = s.find('>').ok_or_else(|| invalid("missing '>'"))?;
        if gt < lt {
            return Err(invalid("misplaced '>'"));
        }

        let name = s[..lt].trim();
        let email = s[lt + 1..gt].trim();
        let mut rest = s[gt + 1..].split_whitespace();

        let seconds: i64 = rest
            .next()
            .ok_or_else(|| invalid("missing timestamp"))?
            .parse()
            .map_err(|_| invalid("bad timestamp"))?;
        let offset = parse_offset(rest.next().ok_or_else(|| invalid("missing offset"))?)
            .ok_or_else(|| invalid("bad offset"))?;
        let when = offset
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| invalid("timestamp out of range"))?;

        Self::new(name, email, when)
    }
}

impl fmt::Debug for PersonIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PersonIdent({})", self.to_git_string())
    }
}

impl fmt::Display for PersonIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Header fields must survive a write/parse cycle byte for byte: the
/// delimiters are forbidden and the parser drops whitespace around the name.
fn validate_field(field: &str, value: &str) -> Result<(), TypeError> {
    if value.contains(|c: char| matches!(c, '<' | '>' | '\n' | '\r')) {
        return Err(TypeError::InvalidIdentity(format!(
            "{field} contains a forbidden character: {value:?}"
        )));
    }
    if value.trim() != value {
        return Err(TypeError::InvalidIdentity(format!(
            "{field} has leading or trailing whitespace: {value:?}"
        )));
    }
    Ok(())
}

fn format_offset(offset: &FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let abs = secs.abs();
    format!("{sign}{:02}{:02}", abs / 3600, (abs % 3600) / 60)
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    if s.len() != 5 || !s.is_ascii() || !s[1..].bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let sign = match &s[..1] {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let hours: i32 = s[1..3].parse().ok()?;
    let minutes: i32 = s[3..5].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
