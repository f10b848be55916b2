use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::{
    auth::session_store::SessionStore,
    core::{
        errors::{WishlistError, WishlistResult},
        models::CredentialRecord,
        password_policy,
        paths::credential_document,
    },
    storage::r#trait::DocumentStore,
};

/// Issues stable user ids and reports who is currently signed in.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user_id(&self) -> WishlistResult<Option<String>>;
    async fn sign_in(&self, email: &str, password: &SecretString) -> WishlistResult<String>;
    async fn sign_up(&self, email: &str, password: &SecretString) -> WishlistResult<String>;
    async fn sign_out(&self) -> WishlistResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Cost {
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for Argon2Cost {
    fn default() -> Self {
        Self {
            m_cost: 19_456,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

impl Argon2Cost {
    fn instance(self) -> WishlistResult<Argon2<'static>> {
        let params = Params::new(self.m_cost, self.t_cost, self.p_cost, None)
            .map_err(|_| WishlistError::Config("invalid argon2 parameters".to_owned()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Email/password provider whose credentials live in the same document store
/// as the wishlists, under `credentials/{email}`.
pub struct LocalIdentityProvider<S: DocumentStore, K: SessionStore> {
    store: S,
    sessions: K,
    cost: Argon2Cost,
}

impl<S: DocumentStore, K: SessionStore> LocalIdentityProvider<S, K> {
    pub fn new(store: S, sessions: K) -> Self {
        Self::with_cost(store, sessions, Argon2Cost::default())
    }

    pub fn with_cost(store: S, sessions: K, cost: Argon2Cost) -> Self {
        Self {
            store,
            sessions,
            cost,
        }
    }

    async fn load_credential(&self, email: &str) -> WishlistResult<Option<CredentialRecord>> {
        let path = credential_document(email)?;
        self.store
            .get_document(&path)
            .await?
            .map(|document| CredentialRecord::from_fields(document.fields))
            .transpose()
    }
}

#[async_trait]
impl<S: DocumentStore, K: SessionStore> IdentityProvider for LocalIdentityProvider<S, K> {
    async fn current_user_id(&self) -> WishlistResult<Option<String>> {
        self.sessions.load()
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> WishlistResult<String> {
        let email = password_policy::normalize_email(email)?;
        let Some(record) = self.load_credential(&email).await? else {
            tracing::debug!("sign-in for unknown email");
            return Err(WishlistError::InvalidCredentials);
        };

        let stored_cost = Argon2Cost {
            m_cost: record.argon2_m_cost,
            t_cost: record.argon2_t_cost,
            p_cost: record.argon2_p_cost,
        };
        let parsed =
            PasswordHash::new(&record.verifier).map_err(|_| WishlistError::InvalidCredentials)?;
        stored_cost
            .instance()?
            .verify_password(password.expose_secret().as_bytes(), &parsed)
            .map_err(|_| WishlistError::InvalidCredentials)?;

        self.sessions.store(&record.uid)?;
        tracing::info!(uid = %record.uid, "signed in");
        Ok(record.uid)
    }

    async fn sign_up(&self, email: &str, password: &SecretString) -> WishlistResult<String> {
        let email = password_policy::normalize_email(email)?;
        password_policy::validate_password(password.expose_secret())?;

        if self.load_credential(&email).await?.is_some() {
            return Err(WishlistError::EmailAlreadyInUse);
        }

        let salt = SaltString::generate(&mut OsRng);
        let verifier = self
            .cost
            .instance()?
            .hash_password(password.expose_secret().as_bytes(), &salt)?
            .to_string();

        let record = CredentialRecord {
            uid: Uuid::new_v4().simple().to_string(),
            verifier,
            argon2_m_cost: self.cost.m_cost,
            argon2_t_cost: self.cost.t_cost,
            argon2_p_cost: self.cost.p_cost,
        };
        self.store
            .set_document(&credential_document(&email)?, &record.to_fields()?)
            .await?;

        self.sessions.store(&record.uid)?;
        tracing::info!(uid = %record.uid, "account registered");
        Ok(record.uid)
    }

    async fn sign_out(&self) -> WishlistResult<()> {
        self.sessions.clear()?;
        tracing::info!("signed out");
        Ok(())
    }
}
