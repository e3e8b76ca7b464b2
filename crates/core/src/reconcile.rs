//! Three-way diff used whenever a child collection must be brought to
//! exactly match a submitted collection (template fields, product values).
//!
//! The diff only decides *what* to do. Applying the plan atomically is the
//! persistence layer's job.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::DbId;

/// An incoming entry matched to an existing child row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpdate<T> {
    pub id: DbId,
    /// Index of the entry in the submission, used as its new sort position.
    pub position: usize,
    pub item: T,
}

/// An incoming entry with no existing counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCreate<T> {
    pub position: usize,
    pub item: T,
}

/// The match/create/delete partition of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan<T> {
    pub updates: Vec<PlannedUpdate<T>>,
    pub creates: Vec<PlannedCreate<T>>,
    /// Existing keys absent from the submission, in their original order.
    pub deletes: Vec<DbId>,
}

impl<T> ReconcilePlan<T> {
    /// Total number of write operations the plan implies.
    pub fn operation_count(&self) -> usize {
        self.updates.len() + self.creates.len() + self.deletes.len()
    }
}

/// Diff a submission whose entries *may* carry the id of an existing row.
///
/// Entries with `Some(id)` are update candidates; entries with `None` are
/// creates. An id that is not among `existing` is reported as
/// [`CoreError::NotFound`] for `entity` rather than silently skipped, and an
/// id submitted twice is a validation error.
pub fn plan_by_id<T, K>(
    existing: &[DbId],
    incoming: Vec<T>,
    key: K,
    entity: &'static str,
) -> Result<ReconcilePlan<T>, CoreError>
where
    K: Fn(&T) -> Option<DbId>,
{
    let current: HashSet<DbId> = existing.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut updates = Vec::new();
    let mut creates = Vec::new();

    for (position, item) in incoming.into_iter().enumerate() {
        match key(&item) {
            Some(id) => {
                if !current.contains(&id) {
                    return Err(CoreError::NotFound { entity, id });
                }
                if !seen.insert(id) {
                    return Err(CoreError::Validation(format!(
                        "{entity} {id} was submitted more than once"
                    )));
                }
                updates.push(PlannedUpdate { id, position, item });
            }
            None => creates.push(PlannedCreate { position, item }),
        }
    }

    let deletes = existing
        .iter()
        .copied()
        .filter(|id| !seen.contains(id))
        .collect();

    Ok(ReconcilePlan {
        updates,
        creates,
        deletes,
    })
}

/// Diff a submission whose entries always carry a key.
///
/// Keys present in `existing` become updates, unknown keys become creates,
/// and existing keys missing from the submission become deletes. A key
/// submitted twice is a validation error.
pub fn plan_by_key<T, K>(
    existing: &[DbId],
    incoming: Vec<T>,
    key: K,
    entity: &'static str,
) -> Result<ReconcilePlan<T>, CoreError>
where
    K: Fn(&T) -> DbId,
{
    let current: HashSet<DbId> = existing.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut updates = Vec::new();
    let mut creates = Vec::new();

    for (position, item) in incoming.into_iter().enumerate() {
        let id = key(&item);
        if !seen.insert(id) {
            return Err(CoreError::Validation(format!(
                "{entity} {id} was submitted more than once"
            )));
        }
        if current.contains(&id) {
            updates.push(PlannedUpdate { id, position, item });
        } else {
            creates.push(PlannedCreate { position, item });
        }
    }

    let deletes = existing
        .iter()
        .copied()
        .filter(|id| !seen.contains(id))
        .collect();

    Ok(ReconcilePlan {
        updates,
        creates,
        deletes,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Entry {
        id: Option<DbId>,
        label: &'static str,
    }

    fn entry(id: Option<DbId>, label: &'static str) -> Entry {
        Entry { id, label }
    }

    #[test]
    fn partitions_into_update_create_delete() {
        let plan = plan_by_id(
            &[1, 2],
            vec![entry(Some(1), "A edited"), entry(None, "C")],
            |e| e.id,
            "TemplateField",
        )
        .unwrap();

        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].id, 1);
        assert_eq!(plan.updates[0].item.label, "A edited");
        assert_eq!(plan.creates.len(), 1);
        assert_eq!(plan.creates[0].position, 1);
        assert_eq!(plan.deletes, vec![2]);
        assert_eq!(plan.operation_count(), 3);
    }

    #[test]
    fn disjoint_submission_deletes_everything_existing() {
        let plan = plan_by_id(
            &[1, 2, 3],
            vec![entry(None, "X"), entry(None, "Y")],
            |e| e.id,
            "TemplateField",
        )
        .unwrap();
        assert!(plan.updates.is_empty());
        assert_eq!(plan.creates.len(), 2);
        assert_eq!(plan.deletes, vec![1, 2, 3]);
    }

    #[test]
    fn identical_submission_only_updates() {
        let plan = plan_by_id(
            &[4, 5],
            vec![entry(Some(5), "B"), entry(Some(4), "A")],
            |e| e.id,
            "TemplateField",
        )
        .unwrap();
        assert_eq!(plan.updates.len(), 2);
        assert_eq!(plan.updates[0].position, 0);
        assert_eq!(plan.updates[0].id, 5);
        assert!(plan.creates.is_empty());
        assert!(plan.deletes.is_empty());
    }

    #[test]
    fn stale_id_is_not_found() {
        let result = plan_by_id(&[1], vec![entry(Some(9), "ghost")], |e| e.id, "TemplateField");
        assert_matches!(
            result,
            Err(CoreError::NotFound {
                entity: "TemplateField",
                id: 9
            })
        );
    }

    #[test]
    fn repeated_id_is_rejected() {
        let result = plan_by_id(
            &[1],
            vec![entry(Some(1), "a"), entry(Some(1), "b")],
            |e| e.id,
            "TemplateField",
        );
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn keyed_plan_creates_unknown_keys() {
        let plan = plan_by_key(&[1, 2], vec![(2, "Electric"), (3, "Red")], |v| v.0, "TemplateField")
            .unwrap();
        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].id, 2);
        assert_eq!(plan.creates.len(), 1);
        assert_eq!(plan.creates[0].item, (3, "Red"));
        assert_eq!(plan.deletes, vec![1]);
    }

    #[test]
    fn keyed_plan_rejects_duplicate_keys() {
        let result = plan_by_key(&[], vec![(3, "a"), (3, "b")], |v| v.0, "TemplateField");
        assert_matches!(result, Err(CoreError::Validation(_)));
    }
}
