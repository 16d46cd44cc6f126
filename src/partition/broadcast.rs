use std::{ops::Deref, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Frozen state shared read-only with every partition.
/// Cloning only bumps the reference count.
#[derive(Debug)]
pub struct Broadcast<T> {
    value: Arc<T>,
}

impl<T> Broadcast<T> {
    pub fn new(value: T) -> Self {
        Self { value: Arc::new(value) }
    }

    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self {
        Self { value: Arc::clone(&self.value) }
    }
}

impl<T> Deref for Broadcast<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

/// Wire form for shipping the snapshot to another process
impl<T> Broadcast<T>
where
    T: Serialize,
{
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self.value.as_ref())?)
    }
}

impl<T> Broadcast<T>
where
    T: DeserializeOwned,
{
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(serde_cbor::from_slice(bytes)?))
    }
}
