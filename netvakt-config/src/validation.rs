//! Custom validation functions shared across configuration modules.

use ipnetwork::IpNetwork;
use validator::ValidationError;

/// Validate that the skip list does not contain the all-zero v4 network,
/// which would silently disable enrichment entirely.
pub fn validate_cidr_list(cidrs: &[IpNetwork]) -> Result<(), ValidationError> {
    if cidrs.iter().any(|n| match n {
        IpNetwork::V4(net) => net.ip().octets() == [0, 0, 0, 0] && net.prefix() == 0,
        IpNetwork::V6(_) => false,
    }) {
        return Err(ValidationError::new("invalid_cidr"));
    }
    Ok(())
}

/// Validate that an interface name follows Linux naming conventions.
/// The pseudo-interface "any" is always accepted.
pub fn validate_interface(name: &str) -> Result<(), ValidationError> {
    let re = regex::Regex::new("^[a-zA-Z0-9_.-]+$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;

    if !name.is_empty() && name.len() <= 15 && re.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_interface"))
    }
}
