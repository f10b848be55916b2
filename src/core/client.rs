use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;

use crate::{
    auth::identity::IdentityProvider,
    core::{
        errors::{WishlistError, WishlistResult},
        models::{UserAccount, WishlistItem},
        password_policy,
        paths::user_document,
        service::{Session, Snapshot, WishlistService},
    },
    storage::r#trait::DocumentStore,
};

/// Application entry point: owns the store and the identity provider and
/// hands out the per-login [`WishlistService`].
///
/// The client does not watch the identity provider. [`Self::attach_session`]
/// has to run after every sign-in, sign-up and application resume; the
/// `sign_in`/`sign_up` helpers do that themselves.
pub struct WishlistClient<S, I>
where
    S: DocumentStore + Clone,
    I: IdentityProvider,
{
    store: S,
    identity: I,
    active: RwLock<Option<Arc<WishlistService<S>>>>,
}

impl<S, I> WishlistClient<S, I>
where
    S: DocumentStore + Clone,
    I: IdentityProvider,
{
    pub fn new(store: S, identity: I) -> Self {
        Self {
            store,
            identity,
            active: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// Binds the client to whoever the identity provider reports as signed in
    /// and loads their wishlist. Returns `None` when nobody is signed in, in
    /// which case the current service and its cache are left alone.
    pub async fn attach_session(&self) -> WishlistResult<Option<Arc<WishlistService<S>>>> {
        let Some(uid) = self.identity.current_user_id().await? else {
            tracing::warn!("no session");
            return Ok(None);
        };

        let service = {
            let mut active = self.active.write().await;
            match active.as_ref() {
                Some(current) if current.uid() == uid => Arc::clone(current),
                _ => {
                    let fresh = Arc::new(WishlistService::new(
                        self.store.clone(),
                        Session::new(uid)?,
                    ));
                    *active = Some(Arc::clone(&fresh));
                    fresh
                }
            }
        };

        service.refresh().await?;
        tracing::info!(uid = %service.uid(), "session attached");
        Ok(Some(service))
    }

    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> WishlistResult<Arc<WishlistService<S>>> {
        password_policy::validate_display_name(name)?;
        password_policy::normalize_email(email)?;
        password_policy::validate_password(password.expose_secret())?;

        let uid = self.identity.sign_up(email, password).await?;
        self.create_account_record(name, &uid).await?;
        self.attach_session()
            .await?
            .ok_or(WishlistError::NoActiveSession)
    }

    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> WishlistResult<Arc<WishlistService<S>>> {
        password_policy::normalize_email(email)?;
        password_policy::validate_password(password.expose_secret())?;

        self.identity.sign_in(email, password).await?;
        self.attach_session()
            .await?
            .ok_or(WishlistError::NoActiveSession)
    }

    /// Ends the session and discards its service together with its cache.
    pub async fn sign_out(&self) -> WishlistResult<()> {
        self.identity.sign_out().await?;
        if let Some(previous) = self.active.write().await.take() {
            tracing::info!(uid = %previous.uid(), "session detached");
        }
        Ok(())
    }

    /// Writes `users/{uid}` for a freshly registered user. The uid has to be
    /// the one the identity provider reports as signed in.
    pub async fn create_account_record(&self, name: &str, uid: &str) -> WishlistResult<()> {
        if uid.is_empty() {
            return Err(WishlistError::invalid_argument("user id is required"));
        }
        let current = self.identity.current_user_id().await?;
        if current.as_deref() != Some(uid) {
            return Err(WishlistError::invalid_argument(
                "user id does not belong to the signed-in user",
            ));
        }

        let account = UserAccount {
            name: name.to_owned(),
            id: uid.to_owned(),
        };
        self.store
            .set_document(&user_document(uid)?, &account.to_fields())
            .await
            .inspect_err(|err| {
                tracing::warn!(uid = %uid, error = %err, "creating account record failed");
            })?;
        tracing::info!(uid = %uid, name = %name, "account record created");
        Ok(())
    }

    /// The active per-login service, or `NoActiveSession`.
    pub async fn service(&self) -> WishlistResult<Arc<WishlistService<S>>> {
        self.active
            .read()
            .await
            .as_ref()
            .map(Arc::clone)
            .ok_or(WishlistError::NoActiveSession)
    }

    pub async fn has_session(&self) -> bool {
        self.active.read().await.is_some()
    }

    pub async fn items(&self) -> WishlistResult<Snapshot> {
        Ok(self.service().await?.items().await)
    }

    pub async fn refresh(&self) -> WishlistResult<Snapshot> {
        self.service().await?.refresh().await
    }

    pub async fn add_item(&self, item: WishlistItem) -> WishlistResult<WishlistItem> {
        self.service().await?.add_item(item).await
    }

    pub async fn edit_item(&self, item: &WishlistItem) -> WishlistResult<Snapshot> {
        self.service().await?.edit_item(item).await
    }

    pub async fn delete_item(&self, item: &WishlistItem) -> WishlistResult<Snapshot> {
        self.service().await?.delete_item(item).await
    }

    pub async fn account(&self) -> WishlistResult<Option<UserAccount>> {
        self.service().await?.account().await
    }
}
