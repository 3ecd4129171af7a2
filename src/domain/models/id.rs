use serde::Deserialize;
use serde_derive::Serialize;
use std::fmt::Display;

/// Key under which a poller is registered. Never empty.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollerId(String);
impl PollerId {
    pub fn new(id: &str) -> Result<Self, EmptyIdError> {
        Self::try_from(id.to_owned())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
impl AsRef<str> for PollerId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
impl TryFrom<String> for PollerId {
    type Error = EmptyIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Err(EmptyIdError)
        } else {
            Ok(Self(value))
        }
    }
}
impl std::borrow::Borrow<str> for PollerId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl Display for PollerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PollerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(PollerIdVisitor)
    }
}

struct PollerIdVisitor;
impl<'de> serde::de::Visitor<'de> for PollerIdVisitor {
    type Value = PollerId;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "a non-empty string")
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        PollerId::new(s).map_err(|_| {
            serde::de::Error::invalid_value(serde::de::Unexpected::Str(s), &self)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyIdError;
impl Display for EmptyIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("poller id must be a non-empty string")
    }
}

impl std::error::Error for EmptyIdError {}
