use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::MenuItemId;

/// Message used when a failure carries no text of its own.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// An encoded QR image, carried as a `data:image/png;base64,...` URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataUrl(String);

impl DataUrl {
    pub const PNG_PREFIX: &'static str = "data:image/png;base64,";

    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Wrap already base64-encoded PNG bytes.
    pub fn from_png_base64(encoded: &str) -> Self {
        Self(format!("{}{encoded}", Self::PNG_PREFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Successful result of a codec call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Encode result, sent as `src`.
    Image(DataUrl),
    /// Decode result, sent as `data`.
    Text(String),
}

impl From<DataUrl> for Payload {
    fn from(value: DataUrl) -> Self {
        Payload::Image(value)
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Text(value)
    }
}

/// Uniform reply shape for every asynchronous outcome.
///
/// Serializes as `{ "ok": true, "src" | "data": .. }` or
/// `{ "ok": false, "message": .. }`. Use [`ResponseEnvelope::tagged`] to add the
/// `action` field expected by content scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseEnvelope {
    Success(Payload),
    Failure(String),
}

impl ResponseEnvelope {
    pub fn success(payload: impl Into<Payload>) -> Self {
        ResponseEnvelope::Success(payload.into())
    }

    /// Build a failure envelope; an empty message is replaced by [`UNKNOWN_ERROR`].
    pub fn failure(error: impl fmt::Display) -> Self {
        let message = error.to_string();
        if message.trim().is_empty() {
            ResponseEnvelope::Failure(UNKNOWN_ERROR.to_string())
        } else {
            ResponseEnvelope::Failure(message)
        }
    }

    pub fn from_result<T, E>(result: Result<T, E>) -> Self
    where
        T: Into<Payload>,
        E: fmt::Display,
    {
        match result {
            Ok(value) => Self::success(value),
            Err(err) => Self::failure(err),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ResponseEnvelope::Success(_))
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            ResponseEnvelope::Success(payload) => Some(payload),
            ResponseEnvelope::Failure(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ResponseEnvelope::Success(_) => None,
            ResponseEnvelope::Failure(message) => Some(message),
        }
    }

    /// Attach the menu item id so the receiving tab can correlate the reply.
    pub fn tagged(self, action: MenuItemId) -> TabMessage {
        TabMessage {
            envelope: self,
            action,
        }
    }

    fn write_fields<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        match self {
            ResponseEnvelope::Success(Payload::Image(src)) => {
                map.serialize_entry("ok", &true)?;
                map.serialize_entry("src", src.as_str())?;
            }
            ResponseEnvelope::Success(Payload::Text(data)) => {
                map.serialize_entry("ok", &true)?;
                map.serialize_entry("data", data)?;
            }
            ResponseEnvelope::Failure(message) => {
                map.serialize_entry("ok", &false)?;
                map.serialize_entry("message", message)?;
            }
        }
        Ok(())
    }
}

impl Serialize for ResponseEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        self.write_fields(&mut map)?;
        map.end()
    }
}

/// Envelope addressed to a tab, tagged with the menu item that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabMessage {
    pub envelope: ResponseEnvelope,
    pub action: MenuItemId,
}

impl Serialize for TabMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        self.envelope.write_fields(&mut map)?;
        map.serialize_entry("action", &self.action)?;
        map.end()
    }
}
