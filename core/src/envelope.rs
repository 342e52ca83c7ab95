//! The success/failure envelope every backend call returns.
//!
//! # Design
//! On the wire the envelope is a flat object tagged by a `success` boolean:
//! `{"success": true, "data": ..., "message": "..."}` or
//! `{"success": false, "message": "..."}`. In Rust it is a sum type, so the
//! payload is only reachable from the `Success` arm. A success object without
//! `data` cannot be represented and is rejected during deserialization.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope<T> {
    Success { data: T, message: String },
    Failure { message: String },
}

impl<T> Envelope<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Envelope::Success {
            data,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Envelope::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    /// The human-readable message, present on both arms.
    pub fn message(&self) -> &str {
        match self {
            Envelope::Success { message, .. } | Envelope::Failure { message } => message,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Envelope::Success { data, .. } => Some(data),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Envelope::Success { data, .. } => Some(data),
            Envelope::Failure { .. } => None,
        }
    }

    /// `Ok(data)` on success, `Err(message)` on failure.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Envelope::Success { data, .. } => Ok(data),
            Envelope::Failure { message } => Err(message),
        }
    }

    /// Decode a wire envelope, keeping "success without data" distinct from a
    /// body that is not an envelope at all.
    pub(crate) fn from_json(body: &str) -> Result<Self, ApiError>
    where
        T: DeserializeOwned,
    {
        let wire: WireEnvelope<T> =
            serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;
        Envelope::try_from(wire)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        match self {
            Envelope::Success { data, message } => Envelope::Success {
                data: f(data),
                message,
            },
            Envelope::Failure { message } => Envelope::Failure { message },
        }
    }
}

impl<T> From<ApiError> for Envelope<T> {
    fn from(err: ApiError) -> Self {
        Envelope::failure(err.to_string())
    }
}

/// The envelope exactly as it appears on the wire.
#[derive(Deserialize)]
struct WireEnvelope<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct WireEnvelopeRef<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    message: &'a str,
}

impl<T> TryFrom<WireEnvelope<T>> for Envelope<T> {
    type Error = ApiError;

    fn try_from(wire: WireEnvelope<T>) -> Result<Self, Self::Error> {
        match (wire.success, wire.data) {
            (true, Some(data)) => Ok(Envelope::Success {
                data,
                message: wire.message,
            }),
            (true, None) => Err(ApiError::MissingData),
            (false, _) => Ok(Envelope::Failure {
                message: wire.message,
            }),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Envelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireEnvelope::<T>::deserialize(deserializer)?;
        Envelope::try_from(wire).map_err(de::Error::custom)
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Envelope::Success { data, message } => WireEnvelopeRef {
                success: true,
                data: Some(data),
                message,
            },
            Envelope::Failure { message } => WireEnvelopeRef {
                success: false,
                data: None,
                message,
            },
        };
        wire.serialize(serializer)
    }
}
