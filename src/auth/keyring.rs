use crate::core::errors::{WishlistError, WishlistResult};

const KEYRING_SERVICE: &str = "wishlist";
const KEYRING_USER: &str = "signed-in-uid";

pub fn store_session_uid(uid: &str) -> WishlistResult<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    entry.set_password(uid)?;
    Ok(())
}

pub fn load_session_uid() -> WishlistResult<Option<String>> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    match entry.get_password() {
        Ok(uid) if uid.is_empty() => Ok(None),
        Ok(uid) => Ok(Some(uid)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(WishlistError::from(err)),
    }
}

pub fn clear_session_uid() -> WishlistResult<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    ignore_missing_entry(entry.delete_password())
}

/// Nothing stored means nobody is signed in; any other failure leaves the
/// previous uid in place and has to reach the caller.
fn ignore_missing_entry(result: Result<(), keyring::Error>) -> WishlistResult<()> {
    match result {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(err) => {
            tracing::warn!(error = %err, "clearing the signed-in uid failed");
            Err(WishlistError::from(err))
        }
    }
}
