//! Identifier management
//!
//! Each element kind gets an [`IdManager`] that both generates fresh ids and
//! converts user-supplied ids into the canonical [`ElementId`] form.

use super::property::PropertyValue;
use super::types::ElementId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Id strategy for one element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdManager {
    /// Sequential longs; supplied ids must be integers or numeric strings
    #[default]
    Long,
    /// Random v4 UUIDs; supplied ids must be UUIDs or UUID strings
    Uuid,
    /// Sequential longs when generated; any string or integer when supplied
    Any,
}

impl IdManager {
    /// Convert a user-supplied id. Returns `None` when the value cannot
    /// represent an id under this strategy.
    pub fn convert(&self, value: &PropertyValue) -> Option<ElementId> {
        match (self, value) {
            (IdManager::Long, PropertyValue::Integer(i)) => Some(ElementId::Long(*i)),
            (IdManager::Long, PropertyValue::String(s)) => s.trim().parse().ok().map(ElementId::Long),
            (IdManager::Uuid, PropertyValue::String(s)) => Uuid::parse_str(s.trim()).ok().map(ElementId::Uuid),
            (IdManager::Any, PropertyValue::Integer(i)) => Some(ElementId::Long(*i)),
            (IdManager::Any, PropertyValue::String(s)) => Some(ElementId::String(s.clone())),
            _ => None,
        }
    }

    /// Whether an already-typed id is acceptable under this strategy
    pub fn accepts(&self, id: &ElementId) -> bool {
        match (self, id) {
            (IdManager::Long, ElementId::Long(_)) => true,
            (IdManager::Uuid, ElementId::Uuid(_)) => true,
            (IdManager::Any, _) => true,
            _ => false,
        }
    }
}

/// Generator state for one id manager
#[derive(Debug, Clone)]
pub(crate) struct IdGenerator {
    manager: IdManager,
    /// `None` once every long up to `i64::MAX` has been handed out or observed
    next: Option<i64>,
}

impl IdGenerator {
    pub(crate) fn new(manager: IdManager) -> Self {
        IdGenerator { manager, next: Some(1) }
    }

    pub(crate) fn manager(&self) -> IdManager {
        self.manager
    }

    /// Produce a fresh id for which `taken` returns false, or `None` when
    /// the long id space is exhausted.
    pub(crate) fn next_id(&mut self, taken: impl Fn(&ElementId) -> bool) -> Option<ElementId> {
        loop {
            let id = match self.manager {
                IdManager::Uuid => ElementId::Uuid(Uuid::new_v4()),
                IdManager::Long | IdManager::Any => {
                    let current = self.next?;
                    self.next = current.checked_add(1);
                    ElementId::Long(current)
                }
            };
            if !taken(&id) {
                return Some(id);
            }
        }
    }

    /// Keep generated longs ahead of user-supplied ones
    pub(crate) fn observe(&mut self, id: &ElementId) {
        if let (ElementId::Long(i), Some(next)) = (id, self.next) {
            if *i >= next {
                self.next = i.checked_add(1);
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        self.next = Some(1);
    }
}
