//! Asset resolution.
//!
//! Decoding images and actor sheets is the job of an external
//! [`AssetProvider`]. The [`AssetStore`] resource caches what the provider
//! returns and applies the engine's recovery rules:
//!
//! - a missing image resolves to the [`PLACEHOLDER`] image and is logged
//! - an actor sheet that fails to load, or has no usable frames, is a
//!   [`EngineError::MalformedActor`]

use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use log::warn;
use rustc_hash::FxHashMap;

use crate::components::actor::FrameSet;
use crate::error::{EngineError, EngineResult};

/// Key of the built-in image substituted for missing ones.
pub const PLACEHOLDER: &str = "__error__";

/// Handle to a decoded image owned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageInfo {
    pub key: String,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
}

impl ImageInfo {
    pub fn new(key: impl Into<String>, width: u32, height: u32) -> Self {
        ImageInfo {
            key: key.into(),
            width,
            height,
        }
    }

    pub fn placeholder() -> Self {
        ImageInfo::new(PLACEHOLDER, 64, 64)
    }
}

/// Source of decoded assets.
pub trait AssetProvider: Send + Sync {
    /// Image by logical name, `None` if it cannot be loaded.
    fn image(&self, name: &str) -> Option<ImageInfo>;
    /// Every action of an actor sheet.
    fn actor(&self, name: &str) -> Result<FrameSet, String>;
}

/// Provider backed by maps filled in code; used by tests and the demo.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    images: FxHashMap<String, ImageInfo>,
    actors: FxHashMap<String, FrameSet>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, name: impl Into<String>, width: u32, height: u32) -> Self {
        let name = name.into();
        self.images.insert(name.clone(), ImageInfo::new(name, width, height));
        self
    }

    pub fn with_actor(mut self, name: impl Into<String>, frames: FrameSet) -> Self {
        self.actors.insert(name.into(), frames);
        self
    }
}

impl AssetProvider for MemoryAssets {
    fn image(&self, name: &str) -> Option<ImageInfo> {
        self.images.get(name).cloned()
    }

    fn actor(&self, name: &str) -> Result<FrameSet, String> {
        self.actors
            .get(name)
            .cloned()
            .ok_or_else(|| format!("no sprite sheet named \"{}\"", name))
    }
}

#[derive(Resource)]
pub struct AssetStore {
    provider: Box<dyn AssetProvider>,
    images: FxHashMap<String, ImageInfo>,
    actors: FxHashMap<String, Arc<FrameSet>>,
}

impl Default for AssetStore {
    fn default() -> Self {
        AssetStore::new(MemoryAssets::new())
    }
}

impl AssetStore {
    pub fn new(provider: impl AssetProvider + 'static) -> Self {
        AssetStore {
            provider: Box::new(provider),
            images: FxHashMap::default(),
            actors: FxHashMap::default(),
        }
    }

    /// Resolve an image, substituting the placeholder when it is missing.
    pub fn image(&mut self, name: &str) -> ImageInfo {
        if let Some(info) = self.images.get(name) {
            return info.clone();
        }
        let info = match self.provider.image(name) {
            Some(info) => info,
            None => {
                warn!("image \"{}\" not found, using placeholder", name);
                self.provider.image(PLACEHOLDER).unwrap_or_else(ImageInfo::placeholder)
            }
        };
        self.images.insert(name.to_string(), info.clone());
        info
    }

    /// Resolve an actor sheet. Sheets with no actions or an empty action
    /// are rejected.
    pub fn actor(&mut self, name: &str) -> EngineResult<Arc<FrameSet>> {
        if let Some(frames) = self.actors.get(name) {
            return Ok(frames.clone());
        }
        let frames = self.provider.actor(name).map_err(|reason| EngineError::MalformedActor {
            name: name.to_string(),
            reason,
        })?;
        if frames.is_empty() {
            return Err(EngineError::MalformedActor {
                name: name.to_string(),
                reason: "sheet has no actions".into(),
            });
        }
        if let Some(action) = frames.first_empty_action() {
            return Err(EngineError::MalformedActor {
                name: name.to_string(),
                reason: format!("action \"{}\" has no frames", action),
            });
        }
        let frames = Arc::new(frames);
        self.actors.insert(name.to_string(), frames.clone());
        Ok(frames)
    }

    pub fn clear_cache(&mut self) {
        self.images.clear();
        self.actors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_image_uses_placeholder() {
        let mut store = AssetStore::new(MemoryAssets::new().with_image("coin", 16, 16));
        assert_eq!(store.image("coin").width, 16);
        assert_eq!(store.image("nope").key, PLACEHOLDER);
    }

    #[test]
    fn actor_sheets_are_validated_and_cached() {
        let good = FrameSet::new().with_action("idle", vec![ImageInfo::new("i", 8, 8)]);
        let bad = FrameSet::new().with_action("idle", vec![]);
        let mut store = AssetStore::new(MemoryAssets::new().with_actor("hero", good).with_actor("ghost", bad));

        let a = store.actor("hero").unwrap();
        let b = store.actor("hero").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(matches!(store.actor("ghost"), Err(EngineError::MalformedActor { .. })));
        assert!(matches!(store.actor("zombie"), Err(EngineError::MalformedActor { .. })));
    }
}
