use serde::Deserialize;
use serde_derive::Serialize;

use std::fmt::Display;

/// An absolute `http` or `https` URL.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Url(String);
impl Url {
    pub fn new(url: String) -> Result<Self, UrlParseError> {
        let parsed = url::Url::parse(url.as_ref()).map_err(|_| UrlParseError::Malformed)?;
        match parsed.scheme() {
            "http" | "https" => Ok(Self(url)),
            other => Err(UrlParseError::UnsupportedScheme(other.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl AsRef<str> for Url {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
impl Display for Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Url {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(UrlVisitor)
    }
}

struct UrlVisitor;
impl<'de> serde::de::Visitor<'de> for UrlVisitor {
    type Value = Url;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "valid http(s) URL")
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Url::new(s.to_owned())
            .map_err(|_| serde::de::Error::invalid_value(serde::de::Unexpected::Str(s), &self))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlParseError {
    Malformed,
    UnsupportedScheme(String),
}
impl Display for UrlParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlParseError::Malformed => f.write_str("failed to parse the URL."),
            UrlParseError::UnsupportedScheme(scheme) => {
                f.write_fmt(format_args!("unsupported URL scheme: {scheme}"))
            }
        }
    }
}
impl std::error::Error for UrlParseError {}
