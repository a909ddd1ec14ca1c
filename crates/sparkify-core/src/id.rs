//! Layer and asset identifiers.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Layer names live here once; every [`EntityId`] is an index into it.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Id of the single character sprite slot.
pub const CHARACTER_ID: &str = "sparky";

/// Names one canvas layer: a text, an uploaded image, or the character.
/// Snapshots and scene nodes carry it by value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(Spur);

impl EntityId {
    /// Layer id for a known name, e.g. one parsed from a snapshot.
    pub fn intern(s: &str) -> Self {
        EntityId(INTERNER.get_or_intern(s))
    }

    /// Layer name as shown in logs and sent over the JS bridge.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// The fixed id of the character slot.
    pub fn character() -> Self {
        Self::intern(CHARACTER_ID)
    }

    /// New layer name such as `text_3` or `image_7`. Numbers are shared
    /// by every editor in the process and never handed out twice, so a
    /// duplicated or re-added layer always gets a name of its own.
    pub fn with_prefix(prefix: &str) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EntityId::intern(&s))
    }
}

/// Key into a scene provider's decoded-image registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl AssetId {
    /// Allocate a new asset key.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        AssetId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = EntityId::intern("text_title");
        let b = EntityId::intern("text_title");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "text_title");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = EntityId::with_prefix("text");
        let b = EntityId::with_prefix("text");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("text_"));
    }

    #[test]
    fn character_id_is_stable() {
        assert_eq!(EntityId::character(), EntityId::intern("sparky"));
    }

    #[test]
    fn layer_name_crosses_json_as_string() {
        let id = EntityId::intern("image_42");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""image_42""#);
        let back: EntityId = serde_json::from_str(r#""image_42""#).unwrap();
        assert_eq!(back, id);
        assert_eq!(format!("{id} {id:?}"), "image_42 #image_42");
    }

    #[test]
    fn asset_ids_increase() {
        let a = AssetId::next();
        let b = AssetId::next();
        assert!(b > a);
    }
}
