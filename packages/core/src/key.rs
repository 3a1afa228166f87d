//! Member keys and fully-qualified key derivation.

use crate::{Error, Result};

/// Validate a local member key.
///
/// Keys must be Unicode identifiers: XID_Start, or an underscore followed by
/// an XID_Continue character, then XID_Continue characters. Dots are
/// reserved as the path separator.
pub fn validate(key: &str) -> Result<()> {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return Err(Error::InvalidKey {
            key: key.to_string(),
            message: "empty key".to_string(),
        });
    };

    let valid_start = unicode_ident::is_xid_start(first)
        || (first == '_'
            && chars
                .clone()
                .next()
                .is_some_and(unicode_ident::is_xid_continue));

    if !valid_start {
        return Err(Error::InvalidKey {
            key: key.to_string(),
            message: "must start with a letter, or an underscore followed by a letter or digit".to_string(),
        });
    }

    for c in chars {
        if !unicode_ident::is_xid_continue(c) {
            return Err(Error::InvalidKey {
                key: key.to_string(),
                message: format!("invalid character '{}' in identifier", c),
            });
        }
    }

    Ok(())
}

/// Join a prefix and a local key with a dot. An empty prefix yields the key.
pub fn qualify(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}
