//! EntityRef: lightweight identity snapshot embedded by other entities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier shared by every stored entity (leagues, teams, rounds, games).
pub type EntityId = Uuid;

/// Which kind of entity a reference points at.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    League,
    Team,
    Round,
    Game,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::League => "league",
            EntityKind::Team => "team",
            EntityKind::Round => "round",
            EntityKind::Game => "game",
        };
        f.write_str(name)
    }
}

/// Immutable display snapshot of an entity. Holders must refresh it when the
/// referenced entity's name or image changes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub text: String,
    pub kind: EntityKind,
    #[serde(default)]
    pub image_url: String,
}

impl EntityRef {
    pub fn new(id: EntityId, text: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id,
            text: text.into(),
            kind,
            image_url: String::new(),
        }
    }
}

/// Helpers over a list of references (rounds of a league, teams of a round, opponents).
pub trait RefList {
    fn has_id(&self, id: EntityId) -> bool;
    /// Drop every entry with this id.
    fn remove_all(&mut self, id: EntityId);
    /// Drop the most recently appended entry with this id. Returns false if none matched.
    fn remove_last(&mut self, id: EntityId) -> bool;
    /// Replace the text and image of every entry matching `entity.id`.
    fn refresh(&mut self, entity: &EntityRef) -> bool;
}

impl RefList for Vec<EntityRef> {
    fn has_id(&self, id: EntityId) -> bool {
        self.iter().any(|r| r.id == id)
    }

    fn remove_all(&mut self, id: EntityId) {
        self.retain(|r| r.id != id);
    }

    fn remove_last(&mut self, id: EntityId) -> bool {
        match self.iter().rposition(|r| r.id == id) {
            Some(idx) => {
                self.remove(idx);
                true
            }
            None => false,
        }
    }

    fn refresh(&mut self, entity: &EntityRef) -> bool {
        let mut changed = false;
        for r in self.iter_mut().filter(|r| r.id == entity.id) {
            r.text = entity.text.clone();
            r.image_url = entity.image_url.clone();
            changed = true;
        }
        changed
    }
}

pub fn new_id() -> EntityId {
    Uuid::new_v4()
}
