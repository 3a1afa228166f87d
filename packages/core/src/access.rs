//! Field access modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// The set of directions a field permits: any combination of read and write.
///
/// Parsed from and rendered as the compact `"rw"` notation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Access {
    read: bool,
    write: bool,
}

impl Access {
    /// Neither readable nor writable.
    pub const NONE: Access = Access {
        read: false,
        write: false,
    };
    /// Read-only.
    pub const READ: Access = Access {
        read: true,
        write: false,
    };
    /// Write-only.
    pub const WRITE: Access = Access {
        read: false,
        write: true,
    };
    /// Readable and writable (the default).
    pub const READ_WRITE: Access = Access {
        read: true,
        write: true,
    };

    pub fn can_read(&self) -> bool {
        self.read
    }

    pub fn can_write(&self) -> bool {
        self.write
    }

    /// The `"rw"` notation for this mode.
    pub fn as_str(&self) -> &'static str {
        match (self.read, self.write) {
            (true, true) => "rw",
            (true, false) => "r",
            (false, true) => "w",
            (false, false) => "",
        }
    }
}

impl Default for Access {
    fn default() -> Self {
        Access::READ_WRITE
    }
}

/// Renders the permitted directions as adjectives, e.g. "readable".
impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.read, self.write) {
            (true, true) => write!(f, "readable and writable"),
            (true, false) => write!(f, "readable"),
            (false, true) => write!(f, "writable"),
            (false, false) => write!(f, "accessible"),
        }
    }
}

impl FromStr for Access {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut access = Access::NONE;
        for c in s.chars() {
            match c {
                'r' => access.read = true,
                'w' => access.write = true,
                other => {
                    return Err(Error::Config {
                        message: format!("invalid access flag '{}' in '{}'", other, s),
                    })
                }
            }
        }
        Ok(access)
    }
}

impl Serialize for Access {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Access {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
