//! Pinned repository item.

use serde::{Deserialize, Serialize};

/// One repository pinned by the user for quick access.
///
/// `owner`/`slug` identify the repository on the forge; lookups compare them
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedRepository {
    /// Row id inside the owning account's settings file.
    pub id: i64,
    pub owner: String,
    pub slug: String,
    /// Display name.
    pub name: String,
    pub image_uri: Option<String>,
}
