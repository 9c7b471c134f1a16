//! Locally addressable image resources.
//!
//! Generated images arrive as base64 payloads. The registry keeps the decoded
//! bytes in memory and hands out opaque locators the editor can store on a
//! node instead of a remote URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::utils::guess_image_mime;

/// Scheme prefix of every resource locator.
pub const RESOURCE_SCHEME: &str = "storyboard-resource://";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(Uuid);

impl ResourceId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a `storyboard-resource://<uuid>` locator.
    pub fn from_locator(locator: &str) -> Option<Self> {
        locator
            .strip_prefix(RESOURCE_SCHEME)
            .and_then(|id| Uuid::parse_str(id).ok())
            .map(Self)
    }

    pub fn locator(&self) -> String {
        format!("{RESOURCE_SCHEME}{}", self.0)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What callers keep: an id plus enough metadata to display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub id: ResourceId,
    pub locator: String,
    pub mime_type: String,
    pub size: usize,
    pub created_at: DateTime<Utc>,
}

/// Decoded image bytes held by the registry.
#[derive(Debug, Clone)]
pub struct ImageResource {
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
    pub created_at: DateTime<Utc>,
}

/// Thread-safe in-memory resource table. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    entries: Arc<RwLock<HashMap<ResourceId, ImageResource>>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes`; a missing or blank mime type is sniffed from content.
    pub fn register(&self, bytes: Vec<u8>, mime_type: Option<&str>) -> ResourceHandle {
        let mime_type = match mime_type.map(str::trim).filter(|m| !m.is_empty()) {
            Some(m) => m.to_string(),
            None => guess_image_mime(&bytes, None),
        };
        let id = ResourceId::new();
        let created_at = Utc::now();
        let handle = ResourceHandle {
            id,
            locator: id.locator(),
            mime_type: mime_type.clone(),
            size: bytes.len(),
            created_at,
        };
        let resource = ImageResource {
            mime_type,
            bytes: Arc::from(bytes),
            created_at,
        };
        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(id, resource);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(id, resource);
            }
        }
        tracing::debug!(resource = %id, size = handle.size, mime = %handle.mime_type, "Registered image resource");
        handle
    }

    pub fn get(&self, id: &ResourceId) -> Option<ImageResource> {
        match self.entries.read() {
            Ok(entries) => entries.get(id).cloned(),
            Err(poisoned) => poisoned.into_inner().get(id).cloned(),
        }
    }

    pub fn get_by_locator(&self, locator: &str) -> Option<ImageResource> {
        ResourceId::from_locator(locator).and_then(|id| self.get(&id))
    }

    /// Drop a resource. Returns whether it existed.
    pub fn revoke(&self, id: &ResourceId) -> bool {
        let removed = match self.entries.write() {
            Ok(mut entries) => entries.remove(id),
            Err(poisoned) => poisoned.into_inner().remove(id),
        };
        removed.is_some()
    }

    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
