//! Validated identifier types shared across figproxy crates.
//!
//! Values coming from outside the process (environment, CLI arguments, HTTP query strings) are
//! parsed into these types once, at the edge. Code that holds a `FileKey` or `NodeId` can place
//! it into a request URL without further checks.

/// Errors that can occur when creating validated identifier types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input contained a character that is not allowed for this identifier
    #[error("invalid character {found:?} in {kind}")]
    InvalidChar { kind: &'static str, found: char },
}

fn trimmed_non_empty(input: &str) -> Result<&str, TextError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TextError::Empty);
    }
    Ok(trimmed)
}

/// Key of a design file, as it appears in `https://www.figma.com/file/<key>/...`.
///
/// Only ASCII alphanumerics, `-` and `_` are accepted, so the key can be used as a URL path
/// segment without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey(String);

impl FileKey {
    /// Parses and validates a file key. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for blank input, or [`TextError::InvalidChar`] for the first
    /// character outside `[A-Za-z0-9_-]`.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = trimmed_non_empty(input.as_ref())?;
        if let Some(found) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(TextError::InvalidChar {
                kind: "file key",
                found,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a node inside a design file, e.g. `1:2` or `I12:34;56:78`.
///
/// Commas are rejected because batch requests join several IDs with `,`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    /// Parses and validates a node ID. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for blank input, or [`TextError::InvalidChar`] if the ID
    /// contains a comma or inner whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = trimmed_non_empty(input.as_ref())?;
        if let Some(found) = trimmed.chars().find(|c| *c == ',' || c.is_whitespace()) {
            return Err(TextError::InvalidChar {
                kind: "node id",
                found,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// API credential for the design-file service.
///
/// The `Debug` implementation never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a non-empty credential. Surrounding whitespace is trimmed.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        Ok(Self(trimmed_non_empty(input.as_ref())?.to_owned()))
    }

    /// Returns the raw secret, for placing into a request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

macro_rules! string_newtype_impls {
    ($ty:ident) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $ty {
            type Err = TextError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $ty::new(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

string_newtype_impls!(FileKey);
string_newtype_impls!(NodeId);
