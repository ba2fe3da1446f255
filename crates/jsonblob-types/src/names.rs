//! Object name validation.
//!
//! Names and namespaces become path segments in the bucket, so they follow
//! DNS-1123 subdomain rules:
//! - Must be non-empty and at most 253 characters
//! - Only lowercase ASCII alphanumerics, `-` and `.`
//! - Must start and end with an alphanumeric character
//! - Must not contain `..`

use crate::error::TypeError;

/// Maximum length of a name or namespace.
pub const MAX_NAME_LEN: usize = 253;

/// Validate an object name or namespace, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use jsonblob_types::names::validate_name;
///
/// assert!(validate_name("node-1").is_ok());
/// assert!(validate_name("web.prod").is_ok());
/// assert!(validate_name("").is_err());
/// assert!(validate_name("../etc").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<(), TypeError> {
    let invalid = |reason: &str| TypeError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name must not be empty"));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(invalid("name must be at most 253 characters"));
    }

    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '.'))
    {
        return Err(TypeError::InvalidName {
            name: name.to_string(),
            reason: format!("contains forbidden character: {ch:?}"),
        });
    }

    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    if !name.starts_with(alnum) || !name.ends_with(alnum) {
        return Err(invalid("must start and end with an alphanumeric character"));
    }

    if name.contains("..") {
        return Err(invalid("must not contain '..'"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_names() {
        assert!(validate_name("a").is_ok());
        assert!(validate_name("node-1").is_ok());
        assert!(validate_name("machine.eu-west.1").is_ok());
        assert!(validate_name("0abc").is_ok());
    }

    #[test]
    fn reject_empty() {
        assert!(validate_name("").is_err());
    }

    #[test]
    fn reject_uppercase_and_slash() {
        assert!(validate_name("Node").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("has space").is_err());
    }

    #[test]
    fn reject_boundaries() {
        assert!(validate_name("-a").is_err());
        assert!(validate_name("a-").is_err());
        assert!(validate_name(".a").is_err());
        assert!(validate_name("a.").is_err());
    }

    #[test]
    fn reject_traversal() {
        assert!(validate_name("a..b").is_err());
        assert!(validate_name("..").is_err());
    }

    #[test]
    fn reject_too_long() {
        let long = "a".repeat(MAX_NAME_LEN + 1);
        assert!(validate_name(&long).is_err());
        let max = "a".repeat(MAX_NAME_LEN);
        assert!(validate_name(&max).is_ok());
    }

    #[test]
    fn error_names_offending_character() {
        let err = validate_name("a_b").unwrap_err();
        assert!(err.to_string().contains("'_'"));
    }

    proptest! {
        #[test]
        fn generated_dns_names_are_accepted(name in "[a-z0-9]([a-z0-9-]{0,30}[a-z0-9])?") {
            prop_assert!(validate_name(&name).is_ok());
        }

        #[test]
        fn names_with_slash_are_rejected(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
            let name = format!("{a}/{b}");
            prop_assert!(validate_name(&name).is_err());
        }
    }
}
