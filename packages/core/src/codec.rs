//! Codecs: convert typed values to and from their string wire form.
//!
//! A codec must round-trip every value its paired checker accepts:
//! `decode(encode(v)) == v`.

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{CodecDoc, Error, Result};

/// Converts between `T` and its string wire representation.
///
/// # Implementing Custom Codecs
///
/// ```rust
/// use relface_core::{Codec, CodecDoc, Error, Result};
///
/// struct Upper;
///
/// impl Codec<String> for Upper {
///     fn encode(&self, value: &String) -> Result<String> {
///         Ok(value.to_uppercase())
///     }
///
///     fn decode(&self, encoded: &str) -> Result<String> {
///         Ok(encoded.to_lowercase())
///     }
///
///     fn doc(&self) -> CodecDoc {
///         CodecDoc {
///             kind: "Upper".to_string(),
///             description: "upper-cases on the wire".to_string(),
///         }
///     }
/// }
/// ```
pub trait Codec<T>: Send + Sync {
    /// Encode a value into its wire string.
    fn encode(&self, value: &T) -> Result<String>;

    /// Decode a wire string into a value.
    fn decode(&self, encoded: &str) -> Result<T>;

    /// Describe this codec for introspection documents.
    fn doc(&self) -> CodecDoc;
}

/// Identity codec for strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl Codec<String> for StringCodec {
    fn encode(&self, value: &String) -> Result<String> {
        Ok(value.clone())
    }

    fn decode(&self, encoded: &str) -> Result<String> {
        Ok(encoded.to_string())
    }

    fn doc(&self) -> CodecDoc {
        CodecDoc {
            kind: "StringCodec".to_string(),
            description: "string stored as-is".to_string(),
        }
    }
}

/// Codec for any type with a `Display`/`FromStr` pair that round-trips:
/// integers, floats, IP addresses.
pub struct ParseCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ParseCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ParseCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ParseCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Codec<T> for ParseCodec<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    fn encode(&self, value: &T) -> Result<String> {
        Ok(value.to_string())
    }

    fn decode(&self, encoded: &str) -> Result<T> {
        encoded.parse().map_err(|e: T::Err| {
            Error::codec(format!(
                "cannot parse '{}' as {}: {}",
                encoded,
                std::any::type_name::<T>(),
                e
            ))
        })
    }

    fn doc(&self) -> CodecDoc {
        CodecDoc {
            kind: "ParseCodec".to_string(),
            description: format!("{} via its string form", std::any::type_name::<T>()),
        }
    }
}

/// Booleans as `"1"` and `"0"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCodec;

impl Codec<bool> for BoolCodec {
    fn encode(&self, value: &bool) -> Result<String> {
        Ok(if *value { "1" } else { "0" }.to_string())
    }

    fn decode(&self, encoded: &str) -> Result<bool> {
        match encoded {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(Error::codec(format!("'{}' is not a boolean", other))),
        }
    }

    fn doc(&self) -> CodecDoc {
        CodecDoc {
            kind: "BoolCodec".to_string(),
            description: "boolean as \"1\" or \"0\"".to_string(),
        }
    }
}

/// Any serde type as compact JSON text.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> Codec<T> for JsonCodec<T> {
    fn encode(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, encoded: &str) -> Result<T> {
        Ok(serde_json::from_str(encoded)?)
    }

    fn doc(&self) -> CodecDoc {
        CodecDoc {
            kind: "JsonCodec".to_string(),
            description: format!("{} as JSON", std::any::type_name::<T>()),
        }
    }
}

/// Binary data as standard base64.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlobCodec;

impl Codec<Vec<u8>> for BlobCodec {
    fn encode(&self, value: &Vec<u8>) -> Result<String> {
        Ok(base64::engine::general_purpose::STANDARD.encode(value))
    }

    fn decode(&self, encoded: &str) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| Error::codec(format!("invalid base64: {}", e)))
    }

    fn doc(&self) -> CodecDoc {
        CodecDoc {
            kind: "BlobCodec".to_string(),
            description: "bytes as base64".to_string(),
        }
    }
}
