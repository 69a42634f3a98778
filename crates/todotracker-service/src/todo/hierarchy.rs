//! Hierarchy validation for subtask parent assignments.
//!
//! Pure graph queries over the persisted parent-pointer structure. All
//! functions run against an open transaction so the decision and the
//! subsequent write observe the same committed tree; callers take the
//! hierarchy advisory lock first (see `TodoRepository::lock_hierarchy`).

use std::collections::{HashSet, VecDeque};

use sqlx::PgConnection;
use uuid::Uuid;

use todotracker_core::error::AppError;
use todotracker_core::result::AppResult;
use todotracker_database::repositories::todo::TodoRepository;

/// Extra iterations tolerated on the upward walk before concluding the
/// stored parent chain is corrupt.
const WALK_SAFETY_MARGIN: u32 = 10;

/// Number of parent edges from `node_id` up to its root (0 for a root).
///
/// The walk is iterative and bounded: exceeding `max_depth` plus a safety
/// margin means the stored chain loops, which validation should have made
/// impossible.
pub async fn depth_of(conn: &mut PgConnection, node_id: Uuid, max_depth: u32) -> AppResult<u32> {
    let mut depth = 0u32;
    let mut current = node_id;
    let mut iterations = 0u32;

    loop {
        let Some(parent) = TodoRepository::parent_id_of(&mut *conn, current).await? else {
            // Row missing; treat the chain as ending here.
            break;
        };
        let Some(parent_id) = parent else {
            break;
        };

        depth += 1;
        current = parent_id;
        iterations += 1;

        if iterations > max_depth + WALK_SAFETY_MARGIN {
            return Err(AppError::validation(
                "Circular reference detected in todo hierarchy",
            ));
        }
    }

    Ok(depth)
}

/// Whether making `new_parent_id` the parent of `todo_id` would create a
/// cycle.
///
/// True when the proposed parent is the todo itself, when the upward walk
/// from the proposed parent reaches the todo, or when the proposed parent
/// is among the todo's transitive descendants. The upward walk catches
/// ancestor cycles cheaply; the descendant check catches arrangements the
/// upward walk cannot reach.
pub async fn would_create_cycle(
    conn: &mut PgConnection,
    todo_id: Uuid,
    new_parent_id: Uuid,
) -> AppResult<bool> {
    if todo_id == new_parent_id {
        return Ok(true);
    }

    let mut visited: HashSet<Uuid> = HashSet::from([todo_id]);
    let mut current = Some(new_parent_id);
    while let Some(id) = current {
        if !visited.insert(id) {
            return Ok(true);
        }
        current = TodoRepository::parent_id_of(&mut *conn, id)
            .await?
            .flatten();
    }

    let mut descendants: HashSet<Uuid> = HashSet::new();
    let mut to_visit: VecDeque<Uuid> = VecDeque::from([todo_id]);
    while let Some(id) = to_visit.pop_front() {
        for child in TodoRepository::child_ids(&mut *conn, id).await? {
            if descendants.insert(child) {
                to_visit.push_back(child);
            }
        }
    }

    Ok(descendants.contains(&new_parent_id))
}

/// Validate a proposed parent assignment.
///
/// A null parent is always legal (moving to the root). Otherwise the
/// parent must exist, reparenting an existing todo (`todo_id` given) must
/// not create a cycle, and the assignment must not push the new node past
/// `max_depth` edges from its root.
pub async fn validate_parent_assignment(
    conn: &mut PgConnection,
    proposed_parent_id: Option<Uuid>,
    todo_id: Option<Uuid>,
    max_depth: u32,
) -> AppResult<()> {
    let Some(parent_id) = proposed_parent_id else {
        return Ok(());
    };

    if !TodoRepository::exists(&mut *conn, parent_id).await? {
        return Err(AppError::validation(format!(
            "Parent todo '{parent_id}' not found"
        )));
    }

    if let Some(todo_id) = todo_id
        && would_create_cycle(&mut *conn, todo_id, parent_id).await?
    {
        return Err(AppError::validation(
            "Cannot set parent: this would create a circular reference",
        ));
    }

    let parent_depth = depth_of(&mut *conn, parent_id, max_depth).await?;
    let new_depth = parent_depth + 1;
    if new_depth > max_depth {
        return Err(AppError::validation(format!(
            "Maximum subtask depth of {max_depth} exceeded. \
             Parent is already at depth {parent_depth}."
        )));
    }

    Ok(())
}
