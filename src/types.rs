//! Core catalog types shared by views and collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an item in the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        ItemId(id)
    }
}

/// Catalog entry as returned by search, browse and per-genre listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl CatalogItem {
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            poster_path: None,
            vote_average: None,
            release_date: None,
        }
    }

    /// Release year, taken from the leading component of `release_date`.
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
            .filter(|year| !year.is_empty())
    }
}

/// Row of the user's saved collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItem {
    pub item: CatalogItem,
    /// Remote creation timestamp, if the collaborator reports one.
    #[serde(default)]
    pub saved_at: Option<String>,
}

/// Full record behind the detail screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub item: CatalogItem,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub runtime_minutes: Option<u32>,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub name: String,
    pub job: String,
}

/// Cast and crew of one item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

impl Credits {
    /// Leading cast members, in billing order.
    pub fn top_cast(&self, limit: usize) -> &[CastMember] {
        &self.cast[..self.cast.len().min(limit)]
    }

    /// Crew members whose job is one of `jobs`, in listing order, at most `limit`.
    pub fn key_crew<'a>(&'a self, jobs: &[&str], limit: usize) -> Vec<&'a CrewMember> {
        self.crew
            .iter()
            .filter(|member| jobs.contains(&member.job.as_str()))
            .take(limit)
            .collect()
    }
}
