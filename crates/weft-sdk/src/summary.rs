use serde::Serialize;
use weft_transform::LinkChanges;
use weft_types::EntityRef;

/// Result of a two-phase save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    /// The saved owner, with its final identifier.
    pub entity: EntityRef,
    /// `true` if the owner row was inserted rather than updated.
    pub created: bool,
    /// Number of columns written to the owner row.
    pub columns: usize,
    /// One entry per committed collection, in property order.
    pub links: Vec<LinkChanges>,
}

impl SaveSummary {
    /// Total link inserts and deletes issued.
    pub fn link_mutations(&self) -> usize {
        self.links
            .iter()
            .map(|l| l.inserted.len() + l.deleted.len())
            .sum()
    }

    pub fn links_of(&self, property: &str) -> Option<&LinkChanges> {
        self.links.iter().find(|l| l.property == property)
    }
}
