use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned identifier of a post or comment.
///
/// The client never originates these; it only echoes them back in mutation
/// payloads and uses them to address rendered nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for ItemId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Post,
    Comment,
}

impl ItemKind {
    /// Prefix of the container element id, e.g. `post_42`.
    pub fn prefix(&self) -> &'static str {
        match self {
            ItemKind::Post => "post_",
            ItemKind::Comment => "comment_",
        }
    }

    /// Name of the form field carrying the id in delete requests.
    pub fn id_field(&self) -> &'static str {
        match self {
            ItemKind::Post => "post_id",
            ItemKind::Comment => "comment_id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Like,
    DeletePost,
    DeleteComment,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Like => "like",
            ActionKind::DeletePost => "delete_post",
            ActionKind::DeleteComment => "delete_comment",
        }
    }
}

/// Typed payload handed to action handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub id: ItemId,
}

impl Action {
    pub fn new<I: Into<ItemId>>(kind: ActionKind, id: I) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// Ordered `name=value` pairs sent as `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.push(name, value);
        self
    }

    pub fn push<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormPayload
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut payload = FormPayload::new();
        for (name, value) in iter {
            payload.push(name, value);
        }
        payload
    }
}

/// Result of a mutation request as seen by the UI layer.
///
/// Failures carry no detail on purpose: every failure of a given action is
/// rendered with the same fixed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Success(String),
    Failure,
}
