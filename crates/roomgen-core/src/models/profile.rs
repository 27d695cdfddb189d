use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The signed-in user's profile.
///
/// Fields the client does not model are kept in `extra` so an update can
/// send the whole profile back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawProfileRecord")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProfileRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub extra: Map<String, Value>,
}

/// Wire shape of a profile. The server may send `_id`, `id` or both.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProfileRecord {
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawProfileRecord> for ProfileRecord {
    fn from(raw: RawProfileRecord) -> Self {
        ProfileRecord {
            id: raw.object_id.or(raw.id),
            first_name: raw.first_name,
            last_name: raw.last_name,
            email: raw.email,
            extra: raw.extra,
        }
    }
}

impl ProfileRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Overlay the edited fields on this profile.
    pub fn merged(&self, update: &ProfileUpdate) -> ProfileRecord {
        let mut merged = self.clone();
        if let Some(ref first_name) = update.first_name {
            merged.first_name = first_name.clone();
        }
        if let Some(ref last_name) = update.last_name {
            merged.last_name = last_name.clone();
        }
        if let Some(ref email) = update.email {
            merged.email = email.clone();
        }
        merged
    }
}

/// Edited profile fields. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.email.is_none()
    }
}
