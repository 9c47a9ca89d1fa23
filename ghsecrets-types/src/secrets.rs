use serde::{Deserialize, Deserializer, Serialize};

use crate::{repository::Repository, timestamp::Timestamp};

/// Public key used to seal secret values before they are uploaded.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(default, deserialize_with = "string_or_int")]
    pub key_id: Option<String>,
    pub key: Option<String>,
}

// Some key types are reported with a numeric id.
fn string_or_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum KeyId {
        Str(String),
        Int(i64),
    }

    Ok(
        Option::<KeyId>::deserialize(deserializer)?.map(|key_id| match key_id {
            KeyId::Str(s) => s,
            KeyId::Int(i) => i.to_string(),
        }),
    )
}

/// Metadata of a stored secret. The value itself is never returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_repositories_url: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secrets {
    pub total_count: u64,
    pub secrets: Vec<Secret>,
}

/// Repository ids granted access to an organization secret.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectedRepoIds(pub Vec<i64>);

impl SelectedRepoIds {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &i64> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a SelectedRepoIds {
    type Item = &'a i64;
    type IntoIter = std::slice::Iter<'a, i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<i64>> for SelectedRepoIds {
    fn from(ids: Vec<i64>) -> Self {
        Self(ids)
    }
}

impl FromIterator<i64> for SelectedRepoIds {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A sealed secret value ready to be written.
///
/// `name` addresses the secret in the request path and is never part of the
/// request body.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptedSecret {
    #[serde(skip)]
    pub name: String,
    pub key_id: String,
    pub encrypted_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "SelectedRepoIds::is_empty")]
    pub selected_repository_ids: SelectedRepoIds,
}

impl EncryptedSecret {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        key_id: impl Into<String>,
        encrypted_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            key_id: key_id.into(),
            encrypted_value: encrypted_value.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedReposList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<Repository>,
}
