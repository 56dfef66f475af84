//! Ref and branch names, checked against the rules of `git check-ref-format`.
//!
//! A name is a `/`-separated list of components. Across the whole name:
//! no ASCII control characters, space, `~ ^ : ? * [ \`, no `..`, no `@{`,
//! no trailing `.`, and not the single character `@`. Every component is
//! non-empty, does not start with `.` and does not end with `.lock`.
//!
//! Branch names additionally may not start with `-` or be `HEAD`, which
//! would be read as an option or as the symbolic ref.

use crate::error::{RefError, Result};

/// Namespace prefix for branch refs.
pub const BRANCH_PREFIX: &str = "refs/heads/";

const FORBIDDEN_CHARS: &[char] = &[' ', '~', '^', ':', '?', '*', '[', '\\'];

/// Canonical ref name for a branch: `main` becomes `refs/heads/main`.
pub fn branch_ref_name(branch: &str) -> String {
    format!("{BRANCH_PREFIX}{branch}")
}

/// Validate a short branch name such as `feature/auth`.
///
/// ```
/// use pgit_refs::names::validate_branch_name;
///
/// assert!(validate_branch_name("feature/auth").is_ok());
/// assert!(validate_branch_name("bad..name").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name == "HEAD" {
        return Err(invalid(name, "'HEAD' is reserved".into()));
    }
    if name.starts_with('-') {
        return Err(invalid(name, "must not start with '-'".into()));
    }
    check_format(name).map_err(|reason| invalid(name, reason))
}

/// Validate a canonical ref name such as `refs/heads/main`.
///
/// The name must be `refs/<namespace>/<rest>` and follow the format rules.
pub fn validate_ref_name(name: &str) -> Result<()> {
    let namespaced = name
        .strip_prefix("refs/")
        .is_some_and(|rest| rest.contains('/'));
    if !namespaced {
        return Err(invalid(
            name,
            "must have the form 'refs/<namespace>/<name>'".into(),
        ));
    }
    check_format(name).map_err(|reason| invalid(name, reason))
}

fn check_format(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("must not be empty".into());
    }
    if name == "@" {
        return Err("must not be '@'".into());
    }
    if let Some(c) = name
        .chars()
        .find(|c| c.is_ascii_control() || FORBIDDEN_CHARS.contains(c))
    {
        return Err(format!("contains forbidden character {c:?}"));
    }
    if name.contains("..") {
        return Err("must not contain '..'".into());
    }
    if name.contains("@{") {
        return Err("must not contain '@{'".into());
    }
    if name.ends_with('.') {
        return Err("must not end with '.'".into());
    }
    for component in name.split('/') {
        if component.is_empty() {
            return Err("has an empty component (leading, trailing or repeated '/')".into());
        }
        if component.starts_with('.') {
            return Err(format!("component {component:?} starts with '.'"));
        }
        if component.ends_with(".lock") {
            return Err(format!("component {component:?} ends with '.lock'"));
        }
    }
    Ok(())
}

fn invalid(name: &str, reason: String) -> RefError {
    RefError::InvalidBranchName {
        name: name.to_string(),
        reason,
    }
}
