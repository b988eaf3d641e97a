//! Record encoding.
//!
//! The store never interprets file contents: a [`Codec`] turns a record into
//! the exact bytes written to its file and back again.

use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;

/// Converts records of type `T` to and from their on-disk bytes.
pub trait Codec<T>: Send + Sync {
    fn encode(&self, record: &T) -> Result<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON encoding via `serde_json`.
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

impl<T> fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonCodec")
    }
}

impl<T: Serialize + DeserializeOwned> Codec<T> for JsonCodec<T> {
    fn encode(&self, record: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(record).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Deserialization(e.to_string()))
    }
}

/// Compact binary encoding via `rmp-serde`.
pub struct MessagePackCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> MessagePackCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for MessagePackCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for MessagePackCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for MessagePackCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MessagePackCodec")
    }
}

impl<T: Serialize + DeserializeOwned> Codec<T> for MessagePackCodec<T> {
    fn encode(&self, record: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(record)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
