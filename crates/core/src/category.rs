//! Four-rank category hierarchy: rank rules, parent-reference derivation,
//! category path checks, and the cascading selection state machine.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const RANK_PRIMARY: &str = "primary";
pub const RANK_SECONDARY: &str = "secondary";
pub const RANK_TERTIARY: &str = "tertiary";
pub const RANK_QUATERNARY: &str = "quaternary";

pub const VALID_RANKS: &[&str] = &[RANK_PRIMARY, RANK_SECONDARY, RANK_TERTIARY, RANK_QUATERNARY];

/// Position of a category in the fixed-depth hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryRank {
    #[serde(alias = "PRIMARY")]
    Primary,
    #[serde(alias = "SECONDARY")]
    Secondary,
    #[serde(alias = "TERTIARY")]
    Tertiary,
    #[serde(alias = "QUATERNARY")]
    Quaternary,
}

impl CategoryRank {
    pub const ALL: [CategoryRank; 4] = [
        Self::Primary,
        Self::Secondary,
        Self::Tertiary,
        Self::Quaternary,
    ];

    /// String representation used in the `categories.category_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => RANK_PRIMARY,
            Self::Secondary => RANK_SECONDARY,
            Self::Tertiary => RANK_TERTIARY,
            Self::Quaternary => RANK_QUATERNARY,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            RANK_PRIMARY => Ok(Self::Primary),
            RANK_SECONDARY => Ok(Self::Secondary),
            RANK_TERTIARY => Ok(Self::Tertiary),
            RANK_QUATERNARY => Ok(Self::Quaternary),
            _ => Err(CoreError::Validation(format!(
                "Invalid category_type '{s}'. Must be one of: {}",
                VALID_RANKS.join(", ")
            ))),
        }
    }

    /// Zero-based depth (primary = 0).
    pub fn depth(&self) -> usize {
        *self as usize
    }

    /// The rank one level up, `None` for primary.
    pub fn parent(&self) -> Option<Self> {
        match self {
            Self::Primary => None,
            Self::Secondary => Some(Self::Primary),
            Self::Tertiary => Some(Self::Secondary),
            Self::Quaternary => Some(Self::Tertiary),
        }
    }

    /// The rank one level down, `None` for quaternary.
    pub fn child(&self) -> Option<Self> {
        match self {
            Self::Primary => Some(Self::Secondary),
            Self::Secondary => Some(Self::Tertiary),
            Self::Tertiary => Some(Self::Quaternary),
            Self::Quaternary => None,
        }
    }
}

impl std::fmt::Display for CategoryRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three ancestor columns stored on every category row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRefs {
    pub parent_primary_id: Option<DbId>,
    pub parent_secondary_id: Option<DbId>,
    pub parent_tertiary_id: Option<DbId>,
}

impl ParentRefs {
    /// The ancestor at `rank`. Quaternary categories are never ancestors.
    pub fn get(&self, rank: CategoryRank) -> Option<DbId> {
        match rank {
            CategoryRank::Primary => self.parent_primary_id,
            CategoryRank::Secondary => self.parent_secondary_id,
            CategoryRank::Tertiary => self.parent_tertiary_id,
            CategoryRank::Quaternary => None,
        }
    }

    fn set(&mut self, rank: CategoryRank, id: DbId) {
        match rank {
            CategoryRank::Primary => self.parent_primary_id = Some(id),
            CategoryRank::Secondary => self.parent_secondary_id = Some(id),
            CategoryRank::Tertiary => self.parent_tertiary_id = Some(id),
            CategoryRank::Quaternary => {}
        }
    }

    /// The immediate parent for a category of `rank`.
    pub fn immediate(&self, rank: CategoryRank) -> Option<DbId> {
        rank.parent().and_then(|p| self.get(p))
    }
}

/// A persisted category reduced to what hierarchy checks need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: DbId,
    pub rank: CategoryRank,
    pub parents: ParentRefs,
}

/// Ancestor columns implied by `rank` and the submitted parent references.
///
/// A primary category carries no parents. Any other rank must name its
/// immediate parent (`parent` is that row, already loaded); the remaining
/// ancestors are copied from it. Supplied ancestors that disagree with the
/// parent's own chain are rejected, as are references below `rank`.
pub fn derive_parent_refs(
    rank: CategoryRank,
    supplied: ParentRefs,
    parent: Option<&CategoryNode>,
) -> Result<ParentRefs, CoreError> {
    for ancestor in CategoryRank::ALL {
        if ancestor >= rank && supplied.get(ancestor).is_some() {
            return Err(CoreError::field(
                format!("parent_{}_id", ancestor.as_str()),
                format!("a {rank} category cannot reference a {ancestor} parent"),
            ));
        }
    }

    let Some(parent_rank) = rank.parent() else {
        return Ok(ParentRefs::default());
    };
    let field = format!("parent_{}_id", parent_rank.as_str());

    let parent = match (supplied.get(parent_rank), parent) {
        (Some(id), Some(node)) if node.id == id => node,
        (Some(id), _) => {
            return Err(CoreError::NotFound {
                entity: "Category",
                id,
            })
        }
        (None, _) => {
            return Err(CoreError::field(
                field,
                format!("a {rank} category requires a {parent_rank} parent"),
            ))
        }
    };

    if parent.rank != parent_rank {
        return Err(CoreError::field(
            field,
            format!(
                "category {} is {}, expected {parent_rank}",
                parent.id, parent.rank
            ),
        ));
    }

    let mut derived = parent.parents;
    derived.set(parent_rank, parent.id);

    for ancestor in CategoryRank::ALL.iter().filter(|r| **r < parent_rank) {
        if let Some(given) = supplied.get(*ancestor) {
            if derived.get(*ancestor) != Some(given) {
                return Err(CoreError::field(
                    format!("parent_{}_id", ancestor.as_str()),
                    format!(
                        "category {given} is not an ancestor of {parent_rank} category {}",
                        parent.id
                    ),
                ));
            }
        }
    }

    Ok(derived)
}

/// Zero-or-one category per rank, as assigned to a product or brand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPath {
    #[serde(default)]
    pub primary_category_id: Option<DbId>,
    #[serde(default)]
    pub secondary_category_id: Option<DbId>,
    #[serde(default)]
    pub tertiary_category_id: Option<DbId>,
    #[serde(default)]
    pub quaternary_category_id: Option<DbId>,
}

impl CategoryPath {
    pub fn get(&self, rank: CategoryRank) -> Option<DbId> {
        match rank {
            CategoryRank::Primary => self.primary_category_id,
            CategoryRank::Secondary => self.secondary_category_id,
            CategoryRank::Tertiary => self.tertiary_category_id,
            CategoryRank::Quaternary => self.quaternary_category_id,
        }
    }

    fn slot(&mut self, rank: CategoryRank) -> &mut Option<DbId> {
        match rank {
            CategoryRank::Primary => &mut self.primary_category_id,
            CategoryRank::Secondary => &mut self.secondary_category_id,
            CategoryRank::Tertiary => &mut self.tertiary_category_id,
            CategoryRank::Quaternary => &mut self.quaternary_category_id,
        }
    }

    /// Ids that are set, highest rank first.
    pub fn ids(&self) -> Vec<DbId> {
        CategoryRank::ALL.iter().filter_map(|r| self.get(*r)).collect()
    }

    /// Fail if some rank is set while a rank above it is empty.
    pub fn validate_contiguous(&self) -> Result<(), CoreError> {
        for rank in CategoryRank::ALL {
            if let (Some(_), Some(parent)) = (self.get(rank), rank.parent()) {
                if self.get(parent).is_none() {
                    return Err(CoreError::field(
                        format!("{rank}_category_id"),
                        format!("a {rank} category requires a {parent} category"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Check the path against the loaded category rows: every id must
    /// exist, sit at its slot's rank, and be a child of the slot above.
    pub fn validate_against(&self, nodes: &[CategoryNode]) -> Result<(), CoreError> {
        self.validate_contiguous()?;

        for rank in CategoryRank::ALL {
            let Some(id) = self.get(rank) else { continue };
            let node = nodes
                .iter()
                .find(|n| n.id == id)
                .ok_or(CoreError::NotFound {
                    entity: "Category",
                    id,
                })?;
            let field = format!("{rank}_category_id");
            if node.rank != rank {
                return Err(CoreError::field(
                    field,
                    format!("category {id} is {}, expected {rank}", node.rank),
                ));
            }
            if let Some(parent_rank) = rank.parent() {
                if node.parents.get(parent_rank) != self.get(parent_rank) {
                    return Err(CoreError::field(
                        field,
                        format!("category {id} is not a child of the selected {parent_rank} category"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Which ranks of a [`CategorySelection`] are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    NoPrimarySelected,
    PrimarySelected,
    SecondarySelected,
    TertiarySelected,
    QuaternarySelected,
}

/// Cascading category picker.
///
/// Choosing a different category at some rank empties every rank below it,
/// and a rank can only be chosen once the rank above it is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategorySelection {
    path: CategoryPath,
}

impl CategorySelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a stored path. The path must be contiguous.
    pub fn from_path(path: CategoryPath) -> Result<Self, CoreError> {
        path.validate_contiguous()?;
        Ok(Self { path })
    }

    pub fn get(&self, rank: CategoryRank) -> Option<DbId> {
        self.path.get(rank)
    }

    pub fn state(&self) -> SelectionState {
        match self.deepest() {
            None => SelectionState::NoPrimarySelected,
            Some(CategoryRank::Primary) => SelectionState::PrimarySelected,
            Some(CategoryRank::Secondary) => SelectionState::SecondarySelected,
            Some(CategoryRank::Tertiary) => SelectionState::TertiarySelected,
            Some(CategoryRank::Quaternary) => SelectionState::QuaternarySelected,
        }
    }

    /// Deepest rank currently selected.
    pub fn deepest(&self) -> Option<CategoryRank> {
        CategoryRank::ALL
            .iter()
            .rev()
            .copied()
            .find(|r| self.path.get(*r).is_some())
    }

    /// Choose `id` at `rank`. Re-choosing the current id keeps lower ranks.
    pub fn select(&mut self, rank: CategoryRank, id: DbId) -> Result<(), CoreError> {
        if let Some(parent) = rank.parent() {
            if self.path.get(parent).is_none() {
                return Err(CoreError::field(
                    format!("{rank}_category_id"),
                    format!("select a {parent} category first"),
                ));
            }
        }
        if self.path.get(rank) == Some(id) {
            return Ok(());
        }
        *self.path.slot(rank) = Some(id);
        if let Some(child) = rank.child() {
            self.clear(child);
        }
        Ok(())
    }

    /// Empty `rank` and every rank below it.
    pub fn clear(&mut self, rank: CategoryRank) {
        for r in CategoryRank::ALL.iter().filter(|r| **r >= rank) {
            *self.path.slot(*r) = None;
        }
    }

    /// The id to filter candidates for `rank` by, i.e. the selection one
    /// rank up. `None` for primary or when the parent is not chosen.
    pub fn parent_for(&self, rank: CategoryRank) -> Option<DbId> {
        rank.parent().and_then(|p| self.path.get(p))
    }

    pub fn path(&self) -> CategoryPath {
        self.path
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn node(id: DbId, rank: CategoryRank, p: Option<DbId>, s: Option<DbId>, t: Option<DbId>) -> CategoryNode {
        CategoryNode {
            id,
            rank,
            parents: ParentRefs {
                parent_primary_id: p,
                parent_secondary_id: s,
                parent_tertiary_id: t,
            },
        }
    }

    fn selected(p: DbId, s: DbId, t: DbId) -> CategorySelection {
        let mut sel = CategorySelection::new();
        sel.select(CategoryRank::Primary, p).unwrap();
        sel.select(CategoryRank::Secondary, s).unwrap();
        sel.select(CategoryRank::Tertiary, t).unwrap();
        sel
    }

    // -- ranks --

    #[test]
    fn rank_parse_round_trips_and_orders() {
        for s in VALID_RANKS {
            assert_eq!(CategoryRank::parse(s).unwrap().as_str(), *s);
        }
        assert!(CategoryRank::Primary < CategoryRank::Quaternary);
        assert_eq!(CategoryRank::Tertiary.depth(), 2);
        assert_eq!(CategoryRank::Primary.parent(), None);
        assert_eq!(CategoryRank::Quaternary.child(), None);
        assert_matches!(CategoryRank::parse("quinary"), Err(CoreError::Validation(_)));
    }

    // -- parent derivation --

    #[test]
    fn primary_has_no_parents() {
        let refs = derive_parent_refs(CategoryRank::Primary, ParentRefs::default(), None).unwrap();
        assert_eq!(refs, ParentRefs::default());

        let bad = ParentRefs {
            parent_primary_id: Some(1),
            ..Default::default()
        };
        assert!(derive_parent_refs(CategoryRank::Primary, bad, None).is_err());
    }

    #[test]
    fn tertiary_inherits_primary_from_secondary_parent() {
        let secondary = node(20, CategoryRank::Secondary, Some(10), None, None);
        let supplied = ParentRefs {
            parent_secondary_id: Some(20),
            ..Default::default()
        };
        let refs = derive_parent_refs(CategoryRank::Tertiary, supplied, Some(&secondary)).unwrap();
        assert_eq!(refs.parent_primary_id, Some(10));
        assert_eq!(refs.parent_secondary_id, Some(20));
        assert_eq!(refs.parent_tertiary_id, None);
        assert_eq!(refs.immediate(CategoryRank::Tertiary), Some(20));
    }

    #[test]
    fn missing_immediate_parent_is_rejected() {
        let supplied = ParentRefs {
            parent_primary_id: Some(10),
            ..Default::default()
        };
        let err = derive_parent_refs(CategoryRank::Tertiary, supplied, None).unwrap_err();
        assert_matches!(err, CoreError::FieldValidation { ref field, .. } if field == "parent_secondary_id");
    }

    #[test]
    fn parent_of_wrong_rank_is_rejected() {
        let primary = node(10, CategoryRank::Primary, None, None, None);
        let supplied = ParentRefs {
            parent_secondary_id: Some(10),
            ..Default::default()
        };
        assert_matches!(
            derive_parent_refs(CategoryRank::Tertiary, supplied, Some(&primary)),
            Err(CoreError::FieldValidation { .. })
        );
    }

    #[test]
    fn contradicting_ancestor_is_rejected() {
        let secondary = node(20, CategoryRank::Secondary, Some(10), None, None);
        let supplied = ParentRefs {
            parent_primary_id: Some(11),
            parent_secondary_id: Some(20),
            parent_tertiary_id: None,
        };
        let err = derive_parent_refs(CategoryRank::Tertiary, supplied, Some(&secondary)).unwrap_err();
        assert_matches!(err, CoreError::FieldValidation { ref field, .. } if field == "parent_primary_id");
    }

    #[test]
    fn reference_at_own_rank_is_rejected() {
        let supplied = ParentRefs {
            parent_primary_id: Some(10),
            parent_secondary_id: Some(20),
            parent_tertiary_id: None,
        };
        assert!(derive_parent_refs(CategoryRank::Secondary, supplied, None).is_err());
    }

    #[test]
    fn unloaded_parent_is_not_found() {
        let supplied = ParentRefs {
            parent_primary_id: Some(99),
            ..Default::default()
        };
        assert_matches!(
            derive_parent_refs(CategoryRank::Secondary, supplied, None),
            Err(CoreError::NotFound { entity: "Category", id: 99 })
        );
    }

    // -- paths --

    #[test]
    fn gap_in_path_is_rejected() {
        let path = CategoryPath {
            primary_category_id: Some(1),
            tertiary_category_id: Some(3),
            ..Default::default()
        };
        assert!(path.validate_contiguous().is_err());
    }

    #[test]
    fn path_checked_against_hierarchy() {
        let nodes = [
            node(1, CategoryRank::Primary, None, None, None),
            node(2, CategoryRank::Secondary, Some(1), None, None),
            node(5, CategoryRank::Secondary, Some(4), None, None),
        ];
        let good = CategoryPath {
            primary_category_id: Some(1),
            secondary_category_id: Some(2),
            ..Default::default()
        };
        assert!(good.validate_against(&nodes).is_ok());
        assert_eq!(good.ids(), vec![1, 2]);

        let foreign_child = CategoryPath {
            secondary_category_id: Some(5),
            ..good
        };
        assert!(foreign_child.validate_against(&nodes).is_err());

        let wrong_rank = CategoryPath {
            primary_category_id: Some(2),
            secondary_category_id: None,
            ..Default::default()
        };
        assert!(wrong_rank.validate_against(&nodes).is_err());

        let missing = CategoryPath {
            primary_category_id: Some(42),
            ..Default::default()
        };
        assert_matches!(
            missing.validate_against(&nodes),
            Err(CoreError::NotFound { id: 42, .. })
        );
    }

    // -- selection state machine --

    #[test]
    fn starts_with_nothing_selected() {
        let sel = CategorySelection::new();
        assert_eq!(sel.state(), SelectionState::NoPrimarySelected);
        assert_eq!(sel.parent_for(CategoryRank::Primary), None);
    }

    #[test]
    fn state_tracks_deepest_selection() {
        let mut sel = selected(1, 2, 3);
        assert_eq!(sel.state(), SelectionState::TertiarySelected);
        sel.select(CategoryRank::Quaternary, 4).unwrap();
        assert_eq!(sel.state(), SelectionState::QuaternarySelected);
        assert_eq!(sel.parent_for(CategoryRank::Quaternary), Some(3));
    }

    #[test]
    fn changing_primary_clears_all_lower_ranks() {
        let mut sel = selected(1, 2, 3);
        sel.select(CategoryRank::Primary, 10).unwrap();

        assert_eq!(sel.get(CategoryRank::Primary), Some(10));
        assert_eq!(sel.get(CategoryRank::Secondary), None);
        assert_eq!(sel.get(CategoryRank::Tertiary), None);
        assert_eq!(sel.get(CategoryRank::Quaternary), None);
        assert_eq!(sel.state(), SelectionState::PrimarySelected);
    }

    #[test]
    fn changing_secondary_keeps_primary() {
        let mut sel = selected(1, 2, 3);
        sel.select(CategoryRank::Quaternary, 4).unwrap();
        sel.select(CategoryRank::Secondary, 20).unwrap();

        assert_eq!(sel.get(CategoryRank::Primary), Some(1));
        assert_eq!(sel.get(CategoryRank::Secondary), Some(20));
        assert_eq!(sel.get(CategoryRank::Tertiary), None);
        assert_eq!(sel.get(CategoryRank::Quaternary), None);
    }

    #[test]
    fn reselecting_same_id_keeps_lower_ranks() {
        let mut sel = selected(1, 2, 3);
        sel.select(CategoryRank::Primary, 1).unwrap();
        assert_eq!(sel.state(), SelectionState::TertiarySelected);
    }

    #[test]
    fn cannot_skip_a_rank() {
        let mut sel = CategorySelection::new();
        assert!(sel.select(CategoryRank::Secondary, 2).is_err());
        sel.select(CategoryRank::Primary, 1).unwrap();
        assert!(sel.select(CategoryRank::Tertiary, 3).is_err());
        assert_eq!(sel.state(), SelectionState::PrimarySelected);
    }

    #[test]
    fn clear_empties_rank_and_below() {
        let mut sel = selected(1, 2, 3);
        sel.clear(CategoryRank::Secondary);
        assert_eq!(sel.state(), SelectionState::PrimarySelected);
        assert_eq!(sel.path().primary_category_id, Some(1));
    }

    #[test]
    fn from_path_rejects_gaps() {
        let path = CategoryPath {
            secondary_category_id: Some(2),
            ..Default::default()
        };
        assert!(CategorySelection::from_path(path).is_err());
        let sel = CategorySelection::from_path(selected(1, 2, 3).path()).unwrap();
        assert_eq!(sel.state(), SelectionState::TertiarySelected);
    }
}
