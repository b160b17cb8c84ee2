use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::SerializeError;

/// Turns a domain event into the string body of a stored event.
pub trait EventSerializer<E>: Send + Sync {
    fn serialize(&self, event: &E) -> Result<String, SerializeError>;
}

/// JSON bodies via `serde_json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, SerializeError> {
        Ok(serde_json::from_str(body)?)
    }
}

impl<E: Serialize> EventSerializer<E> for JsonSerializer {
    fn serialize(&self, event: &E) -> Result<String, SerializeError> {
        Ok(serde_json::to_string(event)?)
    }
}

/// Compact bitcode bodies, base64-encoded so they stay valid strings.
#[derive(Clone, Copy, Debug, Default)]
pub struct BitcodeSerializer;

impl BitcodeSerializer {
    pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, SerializeError> {
        let bytes = STANDARD.decode(body)?;
        Ok(bitcode::deserialize(&bytes)?)
    }
}

impl<E: Serialize> EventSerializer<E> for BitcodeSerializer {
    fn serialize(&self, event: &E) -> Result<String, SerializeError> {
        let bytes = bitcode::serialize(event)?;
        Ok(STANDARD.encode(bytes))
    }
}
