//! Type-keyed registry of in-process clients.
//!
//! Providers publish an implementation under its interface type during
//! `init`; consumers later fetch it by the same type, e.g.
//! `hub.get::<dyn auth::contract::AuthApi>()`. The key is `type_name::<T>()`,
//! which also works for trait objects.

use parking_lot::RwLock;
use std::{any::Any, collections::HashMap, sync::Arc};

#[derive(Debug, thiserror::Error)]
pub enum ClientHubError {
    #[error("client not found: {type_name}")]
    NotFound { type_name: &'static str },

    #[error("type mismatch in hub for {type_name}")]
    TypeMismatch { type_name: &'static str },
}

#[derive(Default)]
pub struct ClientHub {
    map: RwLock<HashMap<&'static str, Box<dyn Any + Send + Sync>>>,
}

impl ClientHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `client` under `T`. Re-registering replaces the previous value;
    /// Arcs already handed out stay valid.
    pub fn register<T>(&self, client: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.map
            .write()
            .insert(std::any::type_name::<T>(), Box::new(client));
    }

    pub fn get<T>(&self) -> Result<Arc<T>, ClientHubError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        let map = self.map.read();
        let boxed = map
            .get(type_name)
            .ok_or(ClientHubError::NotFound { type_name })?;
        boxed
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(ClientHubError::TypeMismatch { type_name })
    }

    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.map.read().contains_key(std::any::type_name::<T>())
    }
}
