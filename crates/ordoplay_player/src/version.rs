// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player version ids: `latest`, or `v` followed by one to three
//! dot-separated numbers.

use crate::error::{PlayerError, Result};

/// Is the id well formed
pub fn is_valid_version(id: &str) -> bool {
    if id == "latest" {
        return true;
    }
    let Some(numbers) = id.strip_prefix('v') else {
        return false;
    };
    let parts: Vec<&str> = numbers.split('.').collect();
    (1..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

/// Reject malformed ids
pub fn check_version(id: &str) -> Result<()> {
    if is_valid_version(id) {
        Ok(())
    } else {
        Err(PlayerError::Version(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_ids() {
        for id in ["latest", "v1", "v1.2", "v10.20.30"] {
            assert!(is_valid_version(id), "{id}");
        }
    }

    #[test]
    fn test_rejected_ids() {
        for id in ["", "v", "1.2", "v1.2.3.4", "v1..2", "v1.x", "latest2", "V1", " v1"] {
            assert!(!is_valid_version(id), "{id}");
        }
        assert!(matches!(check_version("v1."), Err(PlayerError::Version(_))));
    }
}
