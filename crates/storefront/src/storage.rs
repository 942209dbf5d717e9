//! Client-side key-value store.
//!
//! The checkout flow hands data between pages through a small string-keyed,
//! string-valued store scoped to the visitor's session: the logged-in user
//! id, an applied coupon, and the last order receipt. Access goes through
//! typed named keys ([`TypedKey`]) with explicit load/save/clear operations
//! instead of ad hoc string lookups.
//!
//! Values are JSON-encoded strings. The store is last-writer-wins; it is
//! only ever touched by the single active page of a session.

use std::future::Future;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tower_sessions::Session;

/// Errors from the client store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// A stored value could not be decoded.
    #[error("Corrupt value under key '{key}': {source}")]
    Decode {
        key: &'static str,
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage.
    #[error("Failed to encode value for key '{key}': {source}")]
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },
}

/// A string-keyed, string-valued store.
///
/// Implemented by the visitor session in production and by an in-memory
/// map in tests.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw string under a key.
    fn get_raw(
        &self,
        key: &'static str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Write the raw string under a key, replacing any previous value.
    fn put_raw(
        &self,
        key: &'static str,
        value: String,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove the value under a key, if any.
    fn remove_raw(&self, key: &'static str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl KeyValueStore for Session {
    async fn get_raw(&self, key: &'static str) -> Result<Option<String>, StoreError> {
        Ok(self.get::<String>(key).await?)
    }

    async fn put_raw(&self, key: &'static str, value: String) -> Result<(), StoreError> {
        Ok(self.insert(key, value).await?)
    }

    async fn remove_raw(&self, key: &'static str) -> Result<(), StoreError> {
        self.remove::<String>(key).await?;
        Ok(())
    }
}

/// A named key holding a JSON-encoded value of type `T`.
#[derive(Debug, Clone, Copy)]
pub struct TypedKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> TypedKey<T> {
    /// Define a key with a fixed name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The key's name in the store.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Load and decode the value, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the stored string is not
    /// valid JSON for `T`.
    pub async fn load<S: KeyValueStore>(&self, store: &S) -> Result<Option<T>, StoreError> {
        match store.get_raw(self.name).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Decode {
                    key: self.name,
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Encode and store the value.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the store fails.
    pub async fn save<S: KeyValueStore>(&self, store: &S, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: self.name,
            source,
        })?;
        store.put_raw(self.name, raw).await
    }

    /// Remove the value, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn clear<S: KeyValueStore>(&self, store: &S) -> Result<(), StoreError> {
        store.remove_raw(self.name).await
    }
}

/// In-memory store used by unit tests.
#[cfg(test)]
pub(crate) mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::{KeyValueStore, StoreError};

    /// A plain map behind a mutex. Never held across an await point.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        values: Mutex<HashMap<&'static str, String>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn contains(&self, key: &'static str) -> bool {
            self.values.lock().expect("lock poisoned").contains_key(key)
        }
    }

    impl KeyValueStore for MemoryStore {
        async fn get_raw(&self, key: &'static str) -> Result<Option<String>, StoreError> {
            Ok(self.values.lock().expect("lock poisoned").get(key).cloned())
        }

        async fn put_raw(&self, key: &'static str, value: String) -> Result<(), StoreError> {
            self.values.lock().expect("lock poisoned").insert(key, value);
            Ok(())
        }

        async fn remove_raw(&self, key: &'static str) -> Result<(), StoreError> {
            self.values.lock().expect("lock poisoned").remove(key);
            Ok(())
        }
    }
}
