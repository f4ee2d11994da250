//! Team data structure.

use crate::models::entity::{new_id, EntityId, EntityKind, EntityRef};
use serde::{Deserialize, Serialize};

/// Unique identifier for a team (used in games, rounds, history and records).
pub type TeamId = EntityId;

/// A team in a league. Names are unique within their league.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
}

impl Team {
    /// Create a new team with a fresh id and no image.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            image_url: String::new(),
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef {
            id: self.id,
            text: self.name.clone(),
            kind: EntityKind::Team,
            image_url: self.image_url.clone(),
        }
    }
}
