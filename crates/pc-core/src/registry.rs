//! Frame archetype catalog.
//!
//! Archetypes are the platform-shaped templates a frame is created from.
//! The built-in catalog is static and never mutated; lookups that miss fall
//! back to the first entry so a stale archetype id never fails a load.

use serde::Serialize;
use std::fmt;

/// Platform that owns an archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Platform {
    Instagram,
    Reddit,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::Instagram => "Instagram",
            Platform::Reddit => "Reddit",
        })
    }
}

/// Immutable frame template: platform and true pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameArchetype {
    pub id: &'static str,
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: &'static str,
    pub platform: Platform,
}

impl FrameArchetype {
    /// Short prefix used when naming new frames of this archetype (`story-1`, `post-2`, …).
    pub fn name_prefix(&self) -> &'static str {
        match self.id {
            "instagram-story" => "story",
            "instagram-post" => "post",
            "instagram-reel" => "reel",
            "instagram-carousel" => "carousel",
            "reddit-post" => "reddit-post",
            other => other,
        }
    }

    /// Caption block height at full resolution, before preview scaling.
    pub fn caption_height(&self) -> f64 {
        if self.id == "reddit-post" { 120.0 } else { 80.0 }
    }
}

const BUILTIN: [FrameArchetype; 5] = [
    FrameArchetype {
        id: "instagram-story",
        name: "Instagram Story",
        width: 1080,
        height: 1920,
        aspect_ratio: "9:16",
        platform: Platform::Instagram,
    },
    FrameArchetype {
        id: "instagram-post",
        name: "Instagram Post",
        width: 1080,
        height: 1080,
        aspect_ratio: "1:1",
        platform: Platform::Instagram,
    },
    FrameArchetype {
        id: "instagram-reel",
        name: "Instagram Reel",
        width: 1080,
        height: 1920,
        aspect_ratio: "9:16",
        platform: Platform::Instagram,
    },
    FrameArchetype {
        id: "instagram-carousel",
        name: "Instagram Carousel",
        width: 1080,
        height: 1080,
        aspect_ratio: "1:1",
        platform: Platform::Instagram,
    },
    FrameArchetype {
        id: "reddit-post",
        name: "Reddit Post",
        width: 1080,
        height: 1200,
        aspect_ratio: "9:10",
        platform: Platform::Reddit,
    },
];

static REGISTRY: FrameRegistry = FrameRegistry { archetypes: &BUILTIN };

/// Read-only archetype lookup.
#[derive(Debug)]
pub struct FrameRegistry {
    archetypes: &'static [FrameArchetype],
}

impl FrameRegistry {
    /// The built-in catalog.
    pub fn builtin() -> &'static FrameRegistry {
        &REGISTRY
    }

    pub fn all(&self) -> &'static [FrameArchetype] {
        self.archetypes
    }

    pub fn get(&self, id: &str) -> Option<FrameArchetype> {
        self.archetypes.iter().find(|a| a.id == id).copied()
    }

    /// The archetype used when a stored id is unknown.
    pub fn default_archetype(&self) -> FrameArchetype {
        self.archetypes[0]
    }

    /// Resolve an archetype id, degrading to the default instead of failing.
    pub fn resolve_or_default(&self, id: &str) -> FrameArchetype {
        match self.get(id) {
            Some(archetype) => archetype,
            None => {
                log::warn!(
                    "unknown frame archetype {id:?}, falling back to {:?}",
                    self.default_archetype().id
                );
                self.default_archetype()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id() {
        let reg = FrameRegistry::builtin();
        let post = reg.get("instagram-post").unwrap();
        assert_eq!((post.width, post.height), (1080, 1080));
        assert_eq!(post.aspect_ratio, "1:1");
        assert_eq!(reg.get("reddit-post").unwrap().platform, Platform::Reddit);
    }

    #[test]
    fn unknown_id_degrades_to_first() {
        let reg = FrameRegistry::builtin();
        assert!(reg.get("tiktok-video").is_none());
        assert_eq!(reg.resolve_or_default("tiktok-video").id, "instagram-story");
    }

    #[test]
    fn name_prefixes() {
        let reg = FrameRegistry::builtin();
        assert_eq!(reg.get("instagram-story").unwrap().name_prefix(), "story");
        assert_eq!(reg.get("reddit-post").unwrap().name_prefix(), "reddit-post");
    }
}
