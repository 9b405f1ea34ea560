//! Catalog payload types for the external volumes API

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One page of a volumes search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumesPage {
    pub total_items: Option<u64>,
    pub items: Option<Vec<Volume>>,
}

/// A single catalog entry as returned upstream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: String,
    #[serde(default)]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub authors: Option<Vec<String>>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub image_links: Option<ImageLinks>,
    pub preview_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
}

impl Volume {
    pub fn title(&self) -> &str {
        self.volume_info.title.as_deref().unwrap_or("Untitled")
    }

    pub fn authors(&self) -> String {
        self.volume_info
            .authors
            .as_ref()
            .map(|authors| authors.join(", "))
            .unwrap_or_default()
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.volume_info
            .image_links
            .as_ref()
            .and_then(|links| links.thumbnail.as_deref().or(links.small_thumbnail.as_deref()))
    }
}

/// A search result paired with its display color
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub volume: Volume,
    pub color: &'static str,
}

/// Search box on the home page
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SearchForm {
    #[validate(length(min = 1, max = 200, message = "Please enter a title to search for"))]
    pub title: String,
}
