//! Interior design records and AI image generation types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::format_date;

/// A saved design as returned by the designs endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDesignRecord")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DesignRecord {
    pub id: String,
    pub prompt: Option<String>,
    pub room_type: Option<String>,
    pub style: Option<String>,
    pub original_image_url: Option<String>,
    pub generated_image_url: Option<String>,
    pub is_favorite: bool,
    /// RFC 3339 timestamp as sent by the server
    pub created_at: Option<String>,
}

/// Wire shape of a design. The server may send `_id`, `id` or both.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDesignRecord {
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    room_type: Option<String>,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    original_image_url: Option<String>,
    #[serde(default)]
    generated_image_url: Option<String>,
    #[serde(default)]
    is_favorite: bool,
    #[serde(default)]
    created_at: Option<String>,
}

impl TryFrom<RawDesignRecord> for DesignRecord {
    type Error = &'static str;

    fn try_from(raw: RawDesignRecord) -> Result<Self, Self::Error> {
        // `_id` wins when both are present
        let id = raw
            .object_id
            .or(raw.id)
            .ok_or("design record has no `_id` or `id`")?;
        Ok(DesignRecord {
            id,
            prompt: raw.prompt,
            room_type: raw.room_type,
            style: raw.style,
            original_image_url: raw.original_image_url,
            generated_image_url: raw.generated_image_url,
            is_favorite: raw.is_favorite,
            created_at: raw.created_at,
        })
    }
}

impl DesignRecord {
    /// First 8 characters of the id, used as a display label.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((cut, _)) => &self.id[..cut],
            None => &self.id,
        }
    }

    /// `living_room` -> `living room`
    pub fn room_type_label(&self) -> Option<String> {
        self.room_type.as_ref().map(|r| r.replace('_', " "))
    }

    pub fn created_on(&self) -> Option<String> {
        self.created_at.as_deref().map(format_date)
    }
}

/// Fields for creating a design record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewDesign {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_image_url: Option<String>,
}

/// Partial update of a design record. `None` fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DesignUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl DesignUpdate {
    pub fn is_empty(&self) -> bool {
        self.prompt.is_none()
            && self.room_type.is_none()
            && self.style.is_none()
            && self.is_favorite.is_none()
    }
}

/// Interior design styles offered for generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum DesignStyle {
    Modern,
    Scandinavian,
    Industrial,
    Bohemian,
}

impl DesignStyle {
    pub const ALL: [DesignStyle; 4] = [
        DesignStyle::Modern,
        DesignStyle::Scandinavian,
        DesignStyle::Industrial,
        DesignStyle::Bohemian,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            DesignStyle::Modern => "modern",
            DesignStyle::Scandinavian => "scandinavian",
            DesignStyle::Industrial => "industrial",
            DesignStyle::Bohemian => "bohemian",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DesignStyle::Modern => "Modern",
            DesignStyle::Scandinavian => "Scandinavian",
            DesignStyle::Industrial => "Industrial",
            DesignStyle::Bohemian => "Bohemian",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DesignStyle::Modern => "Clean lines and minimal decoration",
            DesignStyle::Scandinavian => "Light, airy and functional",
            DesignStyle::Industrial => "Raw materials and urban feel",
            DesignStyle::Bohemian => "Artistic and free-spirited",
        }
    }
}

impl fmt::Display for DesignStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DesignStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|style| style.id() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|s| s.id()).collect();
                format!("unknown style '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// An image generation request, sent as multipart form data.
#[derive(Clone)]
pub struct GenerationJob {
    /// JPEG bytes of the room photo
    pub image: Vec<u8>,
    pub prompt: String,
    pub room_type: String,
    pub style: DesignStyle,
}

impl fmt::Debug for GenerationJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationJob")
            .field("image_bytes", &self.image.len())
            .field("prompt", &self.prompt)
            .field("room_type", &self.room_type)
            .field("style", &self.style)
            .finish()
    }
}

/// Raw generation response before the required URLs are checked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub generated_image_url: Option<String>,
    #[serde(default)]
    pub original_image_url: Option<String>,
    #[serde(default)]
    pub design: Option<DesignRecord>,
}

/// A completed generation: both image URLs are guaranteed present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct GeneratedImage {
    pub generated_image_url: String,
    pub original_image_url: String,
    pub design: Option<DesignRecord>,
}

impl TryFrom<GenerateResponse> for GeneratedImage {
    type Error = &'static str;

    fn try_from(raw: GenerateResponse) -> Result<Self, Self::Error> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let generated_image_url =
            non_empty(raw.generated_image_url).ok_or("response is missing generatedImageUrl")?;
        let original_image_url =
            non_empty(raw.original_image_url).ok_or("response is missing originalImageUrl")?;

        Ok(GeneratedImage {
            generated_image_url,
            original_image_url,
            design: raw.design,
        })
    }
}
