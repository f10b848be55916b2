//! Hierarchical addresses into the document store.
//!
//! A collection path has an odd number of segments (`users`, `users/{uid}/items`),
//! a document path an even number (`users/{uid}`, `users/{uid}/items/{id}`).

use std::fmt::{Display, Formatter};

use rand::{Rng, distr::Alphanumeric};

use crate::core::errors::{WishlistError, WishlistResult};

pub const USERS_COLLECTION: &str = "users";
pub const ITEMS_COLLECTION: &str = "items";
pub const CREDENTIALS_COLLECTION: &str = "credentials";
pub const AUTO_ID_LENGTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    segments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    segments: Vec<String>,
}

fn validate_segment(segment: &str) -> WishlistResult<()> {
    if segment.is_empty() {
        return Err(WishlistError::invalid_argument("empty path segment"));
    }
    if segment.contains('/') {
        return Err(WishlistError::invalid_argument(format!(
            "path segment `{segment}` contains '/'"
        )));
    }
    if segment == "." || segment == ".." {
        return Err(WishlistError::invalid_argument(format!(
            "path segment `{segment}` is reserved"
        )));
    }
    Ok(())
}

fn split(path: &str) -> WishlistResult<Vec<String>> {
    let segments = path.split('/').map(str::to_owned).collect::<Vec<_>>();
    for segment in &segments {
        validate_segment(segment)?;
    }
    Ok(segments)
}

impl CollectionPath {
    pub fn root(name: &str) -> WishlistResult<Self> {
        validate_segment(name)?;
        Ok(Self {
            segments: vec![name.to_owned()],
        })
    }

    pub fn parse(path: &str) -> WishlistResult<Self> {
        let segments = split(path)?;
        if segments.len() % 2 == 0 {
            return Err(WishlistError::invalid_argument(format!(
                "`{path}` is not a collection path"
            )));
        }
        Ok(Self { segments })
    }

    pub fn doc(&self, id: &str) -> WishlistResult<DocumentPath> {
        validate_segment(id)?;
        let mut segments = self.segments.clone();
        segments.push(id.to_owned());
        Ok(DocumentPath { segments })
    }

    /// Last segment, i.e. the collection's own name.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn canonical_string(&self) -> String {
        self.segments.join("/")
    }
}

impl DocumentPath {
    pub fn parse(path: &str) -> WishlistResult<Self> {
        let segments = split(path)?;
        if segments.len() % 2 != 0 {
            return Err(WishlistError::invalid_argument(format!(
                "`{path}` is not a document path"
            )));
        }
        Ok(Self { segments })
    }

    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn parent(&self) -> CollectionPath {
        let mut segments = self.segments.clone();
        segments.pop();
        CollectionPath { segments }
    }

    pub fn collection(&self, name: &str) -> WishlistResult<CollectionPath> {
        validate_segment(name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_owned());
        Ok(CollectionPath { segments })
    }

    pub fn canonical_string(&self) -> String {
        self.segments.join("/")
    }
}

impl Display for CollectionPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical_string())
    }
}

impl Display for DocumentPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical_string())
    }
}

/// `users/{uid}`
pub fn user_document(uid: &str) -> WishlistResult<DocumentPath> {
    CollectionPath::root(USERS_COLLECTION)?.doc(uid)
}

/// `users/{uid}/items`
pub fn items_collection(uid: &str) -> WishlistResult<CollectionPath> {
    user_document(uid)?.collection(ITEMS_COLLECTION)
}

/// `users/{uid}/items/{item_id}`
pub fn item_document(uid: &str, item_id: &str) -> WishlistResult<DocumentPath> {
    items_collection(uid)?.doc(item_id)
}

pub fn credential_document(email: &str) -> WishlistResult<DocumentPath> {
    CollectionPath::root(CREDENTIALS_COLLECTION)?.doc(email)
}

pub fn generate_document_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .take(AUTO_ID_LENGTH)
        .collect()
}
