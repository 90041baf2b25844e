use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stored entity.
///
/// Wraps a UUID to provide type safety and prevent mixing up
/// entity IDs with other UUID-based identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Creates a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an entity ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses an entity ID from its string form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<EntityId> for Uuid {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// A foreign key that may be stored as a typed identifier or as a raw
/// string.
///
/// The persisted data carries references in both shapes. `parse` is the
/// single coercion point: a syntactically valid UUID becomes `Id`, anything
/// else is preserved verbatim as `Raw` so no information is dropped at
/// ingress. Both variants serialize as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    /// A normalized, typed identifier.
    Id(EntityId),
    /// A raw string that did not parse as an identifier.
    Raw(String),
}

impl EntityRef {
    /// Coerces a string into the typed form when syntactically valid,
    /// preserving the raw value otherwise.
    pub fn parse(s: &str) -> Self {
        match EntityId::parse(s) {
            Ok(id) => EntityRef::Id(id),
            Err(_) => EntityRef::Raw(s.to_string()),
        }
    }

    /// Returns the typed identifier, if this reference is normalized.
    pub fn as_id(&self) -> Option<EntityId> {
        match self {
            EntityRef::Id(id) => Some(*id),
            EntityRef::Raw(s) => EntityId::parse(s).ok(),
        }
    }

    /// Returns true if this reference points at the given entity under
    /// either representation.
    pub fn matches(&self, id: EntityId) -> bool {
        match self {
            EntityRef::Id(own) => *own == id,
            EntityRef::Raw(s) => s == &id.to_string(),
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityRef::Id(id) => write!(f, "{id}"),
            EntityRef::Raw(s) => write!(f, "{s}"),
        }
    }
}

impl From<EntityId> for EntityRef {
    fn from(id: EntityId) -> Self {
        EntityRef::Id(id)
    }
}
