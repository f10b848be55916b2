use std::sync::{PoisonError, RwLock};

use crate::{auth::keyring, core::errors::WishlistResult};

/// Where the identity provider remembers who is signed in.
pub trait SessionStore: Send + Sync {
    fn store(&self, uid: &str) -> WishlistResult<()>;
    fn load(&self) -> WishlistResult<Option<String>>;
    fn clear(&self) -> WishlistResult<()>;
}

/// Persists the signed-in uid in the OS keyring so it survives restarts.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringSessionStore;

impl SessionStore for KeyringSessionStore {
    fn store(&self, uid: &str) -> WishlistResult<()> {
        keyring::store_session_uid(uid)
    }

    fn load(&self) -> WishlistResult<Option<String>> {
        keyring::load_session_uid()
    }

    fn clear(&self) -> WishlistResult<()> {
        keyring::clear_session_uid()
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    uid: RwLock<Option<String>>,
}

impl SessionStore for MemorySessionStore {
    fn store(&self, uid: &str) -> WishlistResult<()> {
        *self.uid.write().unwrap_or_else(PoisonError::into_inner) = Some(uid.to_owned());
        Ok(())
    }

    fn load(&self) -> WishlistResult<Option<String>> {
        Ok(self
            .uid
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn clear(&self) -> WishlistResult<()> {
        *self.uid.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
