use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::{WishlistError, WishlistResult};

/// Body of a stored document.
pub type Fields = serde_json::Map<String, Value>;

pub const ITEM_ID_FIELD: &str = "id";
pub const ITEM_NAME_FIELD: &str = "name";
pub const ACCOUNT_NAME_FIELD: &str = "name";

/// A document as returned by the store: its own address id plus its body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishlistItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Description, price and whatever else the presentation layer stores.
    #[serde(flatten)]
    pub details: Fields,
}

impl WishlistItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            details: Fields::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// An item is usable once the store has assigned its id.
    pub fn is_usable(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Body written to the store. `name` and `id` always come from the item
    /// itself; detail entries under those keys are dropped.
    pub fn to_fields(&self) -> WishlistResult<Fields> {
        let mut fields = self.details.clone();
        fields.remove(ITEM_ID_FIELD);
        fields.insert(ITEM_NAME_FIELD.to_owned(), Value::String(self.name.clone()));
        if let Some(id) = &self.id {
            fields.insert(ITEM_ID_FIELD.to_owned(), Value::String(id.clone()));
        }
        Ok(fields)
    }

    /// Decodes a stored item. The body's `id` is only trusted when it matches
    /// the document's address; otherwise the item comes back without one.
    pub fn from_document(document: Document) -> WishlistResult<Self> {
        let mut item: WishlistItem = serde_json::from_value(Value::Object(document.fields))?;
        if item.id.as_deref() != Some(document.id.as_str()) {
            tracing::warn!(
                item_id = %document.id,
                body_id = ?item.id,
                "stored item id does not match its document address"
            );
            item.id = None;
        }
        Ok(item)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserAccount {
    pub name: String,
    pub id: String,
}

impl UserAccount {
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(ACCOUNT_NAME_FIELD.to_owned(), Value::String(self.name.clone()));
        fields
    }

    pub fn from_document(document: Document) -> WishlistResult<Self> {
        let name = document
            .fields
            .get(ACCOUNT_NAME_FIELD)
            .and_then(Value::as_str)
            .ok_or(WishlistError::Serialization)?
            .to_owned();
        Ok(Self {
            name,
            id: document.id,
        })
    }
}

/// Stored under `credentials/{email}` by the local identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub uid: String,
    pub verifier: String,
    pub argon2_m_cost: u32,
    pub argon2_t_cost: u32,
    pub argon2_p_cost: u32,
}

impl CredentialRecord {
    pub fn to_fields(&self) -> WishlistResult<Fields> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            _ => Err(WishlistError::Serialization),
        }
    }

    pub fn from_fields(fields: Fields) -> WishlistResult<Self> {
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}
