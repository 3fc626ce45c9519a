//! The ordered, append-only history of ChangeSets.

use crate::change::ChangeSet;
use crate::error::CatalogError;

/// Every ChangeSet ever shipped, ordered by id.
///
/// The catalog is the same for all database kinds. Ids start at 1 and
/// increase by exactly 1; [`ChangeSetCatalog::new`] sorts whatever order the
/// ChangeSets were registered in and rejects gaps and duplicates.
#[derive(Debug, Clone, Default)]
pub struct ChangeSetCatalog {
    changesets: Vec<ChangeSet>,
}

impl ChangeSetCatalog {
    /// Build a catalog from `changesets` in any order.
    pub fn new(mut changesets: Vec<ChangeSet>) -> Result<Self, CatalogError> {
        changesets.sort_by_key(ChangeSet::id);
        let catalog = Self { changesets };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check that ids run 1, 2, 3, ... without gaps or duplicates.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut previous = 0;
        for (position, changeset) in self.changesets.iter().enumerate() {
            let expected = position as u32 + 1;
            let id = changeset.id();
            if id == expected {
                previous = id;
                continue;
            }
            if position > 0 && id == previous {
                return Err(CatalogError::Duplicate { id });
            }
            return Err(CatalogError::Gap {
                expected,
                found: id,
            });
        }
        Ok(())
    }

    /// ChangeSets with an id greater than `after`, in ascending order.
    ///
    /// Later ChangeSets assume the schema left behind by every earlier one,
    /// so this order is the only order they may be applied in.
    pub fn pending(&self, after: u32) -> &[ChangeSet] {
        let start = self.changesets.partition_point(|cs| cs.id() <= after);
        &self.changesets[start..]
    }

    /// Id of the newest ChangeSet, or 0 for an empty catalog.
    pub fn latest(&self) -> u32 {
        self.changesets.last().map_or(0, ChangeSet::id)
    }

    pub fn get(&self, id: u32) -> Option<&ChangeSet> {
        let index = id.checked_sub(1)? as usize;
        self.changesets.get(index).filter(|cs| cs.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangeSet> {
        self.changesets.iter()
    }

    pub fn len(&self) -> usize {
        self.changesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changesets.is_empty()
    }
}
