//! Task queue derivation (pure functions, no I/O)
//!
//! Turns a goal snapshot plus the user's custom ordering into the list of
//! goals that can be worked on right now:
//!
//! - a goal is a *container* while any other incomplete goal names it as a
//!   parent, and containers never appear in the queue
//! - every remaining incomplete goal is an *actionable leaf*
//! - leaves inherit the most urgent priority of their incomplete ancestors
//! - ids from the custom order come first, the rest follow by effective
//!   priority then newest first
//!
//! The queue is recomputed from scratch on every change to the graph.

use crate::model::{Goal, GoalGraph, Priority};
use serde::Serialize;
use std::collections::HashSet;

/// One actionable entry in the queue
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem<'a> {
    pub goal: &'a Goal,
    /// Topmost ancestor along first-parent edges (None without a parent or on a cycle)
    #[serde(serialize_with = "serialize_root")]
    pub root: Option<&'a Goal>,
    pub effective_priority: Priority,
}

fn serialize_root<S: serde::Serializer>(
    root: &Option<&Goal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct RootRef<'r> {
        id: &'r str,
        content: &'r str,
    }

    match root {
        Some(g) => serializer.serialize_some(&RootRef {
            id: &g.id,
            content: &g.content,
        }),
        None => serializer.serialize_none(),
    }
}

/// Derive the ordered list of actionable goals
pub fn derive_queue<'a>(goals: &'a [Goal], custom_order: &[String]) -> Vec<TaskItem<'a>> {
    let graph = GoalGraph::new(goals);
    let containers = container_ids(goals);
    let is_actionable = |g: &Goal| !g.is_completed && !containers.contains(g.id.as_str());

    let make_item = |goal: &'a Goal| TaskItem {
        goal,
        root: goal_root(&graph, &goal.id),
        effective_priority: effective_priority(&graph, goal),
    };

    let mut emitted: HashSet<&str> = HashSet::new();
    let mut queue = Vec::new();

    // Custom order first; stale or blocked ids are dropped
    for id in custom_order {
        if let Some(goal) = graph.get(id) {
            if is_actionable(goal) && emitted.insert(goal.id.as_str()) {
                queue.push(make_item(goal));
            }
        }
    }

    let mut remaining = Vec::new();
    for goal in goals {
        if is_actionable(goal) && emitted.insert(goal.id.as_str()) {
            remaining.push(make_item(goal));
        }
    }

    remaining.sort_by(|a, b| {
        a.effective_priority
            .cmp(&b.effective_priority)
            .then_with(|| b.goal.created_at.cmp(&a.goal.created_at))
    });

    tracing::trace!(
        goals = goals.len(),
        pinned = queue.len(),
        sorted = remaining.len(),
        "derived task queue"
    );

    queue.extend(remaining);
    queue
}

/// Ids named as a parent by some other incomplete goal
pub fn container_ids(goals: &[Goal]) -> HashSet<&str> {
    goals
        .iter()
        .filter(|g| !g.is_completed)
        .flat_map(|g| {
            g.parent_ids
                .iter()
                .filter(move |pid| **pid != g.id)
                .map(String::as_str)
        })
        .collect()
}

/// Find the topmost ancestor of a goal by following the first existing
/// parent at each step.
///
/// Returns None if the goal has no parent or a cycle is hit before reaching
/// a goal without parents.
pub fn goal_root<'a>(graph: &GoalGraph<'a>, goal_id: &str) -> Option<&'a Goal> {
    let start = graph.get(goal_id)?;
    let mut visited: HashSet<&str> = HashSet::from([start.id.as_str()]);
    let mut current = graph.first_parent(start)?;

    loop {
        if !visited.insert(current.id.as_str()) {
            return None; // Cycle detected
        }
        match graph.first_parent(current) {
            Some(parent) => current = parent,
            None => return Some(current),
        }
    }
}

/// Most urgent priority among the goal and every ancestor reachable through
/// incomplete parents. A completed parent ends that branch of the walk.
pub fn effective_priority<'a>(graph: &GoalGraph<'a>, goal: &'a Goal) -> Priority {
    let mut best = goal.priority;
    let mut visited: HashSet<&str> = HashSet::from([goal.id.as_str()]);
    let mut stack = vec![goal];

    while let Some(current) = stack.pop() {
        best = best.min(current.priority);
        if best == Priority::P0 {
            break;
        }
        for parent in graph.parents(current) {
            if !parent.is_completed && visited.insert(parent.id.as_str()) {
                stack.push(parent);
            }
        }
    }

    best
}

/// Id sequence to persist after the user reorders the queue
pub fn order_ids(items: &[TaskItem<'_>]) -> Vec<String> {
    items.iter().map(|item| item.goal.id.clone()).collect()
}

/// Move the given ids to the front of the current queue order, keeping the
/// rest in queue order. Unknown or non-actionable ids are ignored.
pub fn pin_to_front(items: &[TaskItem<'_>], ids: &[String]) -> Vec<String> {
    let present: HashSet<&str> = items.iter().map(|i| i.goal.id.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut order = Vec::with_capacity(items.len());

    for id in ids {
        if present.contains(id.as_str()) && seen.insert(id.as_str()) {
            order.push(id.clone());
        }
    }
    for item in items {
        if seen.insert(item.goal.id.as_str()) {
            order.push(item.goal.id.clone());
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn make_goal(id: &str, parents: &[&str], priority: Priority, age_minutes: i64) -> Goal {
        let mut g = Goal::new(format!("Goal {}", id));
        g.id = id.to_string();
        g.parent_ids = parents.iter().map(|p| p.to_string()).collect();
        g.priority = priority;
        g.created_at =
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() - Duration::minutes(age_minutes);
        g
    }

    fn ids<'a>(items: &'a [TaskItem<'a>]) -> Vec<&'a str> {
        items.iter().map(|i| i.goal.id.as_str()).collect()
    }

    #[test]
    fn test_containers_hidden_until_children_complete() {
        let mut goals = vec![
            make_goal("root", &[], Priority::P2, 10),
            make_goal("child", &["root"], Priority::P2, 5),
        ];

        let queue = derive_queue(&goals, &[]);
        assert_eq!(ids(&queue), vec!["child"]);

        goals[1].is_completed = true;
        let queue = derive_queue(&goals, &[]);
        assert_eq!(ids(&queue), vec!["root"]);
    }

    #[test]
    fn test_completed_child_does_not_block_parent() {
        let mut goals = vec![
            make_goal("root", &[], Priority::P2, 10),
            make_goal("a", &["root"], Priority::P2, 5),
            make_goal("b", &["root"], Priority::P2, 4),
        ];
        goals[1].is_completed = true;

        let queue = derive_queue(&goals, &[]);
        assert_eq!(ids(&queue), vec!["b"]);
    }

    #[test]
    fn test_priority_inherited_from_incomplete_ancestor() {
        let mut goals = vec![
            make_goal("urgent", &[], Priority::P0, 30),
            make_goal("mid", &["urgent"], Priority::P2, 20),
            make_goal("leaf", &["mid"], Priority::P2, 10),
            make_goal("other", &[], Priority::P1, 0),
        ];

        let queue = derive_queue(&goals, &[]);
        assert_eq!(ids(&queue), vec!["leaf", "other"]);
        assert_eq!(queue[0].effective_priority, Priority::P0);

        // Completing the ancestor drops the inheritance
        goals[0].is_completed = true;
        let graph = GoalGraph::new(&goals);
        assert_eq!(effective_priority(&graph, &goals[2]), Priority::P2);
    }

    #[test]
    fn test_sort_newest_first_within_priority() {
        let goals = vec![
            make_goal("old", &[], Priority::P1, 60),
            make_goal("new", &[], Priority::P1, 1),
            make_goal("low", &[], Priority::P2, 0),
        ];

        let queue = derive_queue(&goals, &[]);
        assert_eq!(ids(&queue), vec!["new", "old", "low"]);
    }

    #[test]
    fn test_custom_order_wins_and_drops_stale_ids() {
        let goals = vec![
            make_goal("x", &[], Priority::P2, 10),
            make_goal("y", &[], Priority::P2, 20),
            make_goal("z", &[], Priority::P0, 30),
            make_goal("parent", &[], Priority::P0, 40),
            make_goal("kid", &["parent"], Priority::P2, 0),
        ];
        let order = vec![
            "x".to_string(),
            "ghost".to_string(),
            "parent".to_string(),
            "y".to_string(),
            "x".to_string(),
        ];

        // kid inherits P0 from parent and is newer than z
        let queue = derive_queue(&goals, &order);
        assert_eq!(ids(&queue), vec!["x", "y", "kid", "z"]);
    }

    #[test]
    fn test_root_resolution() {
        let goals = vec![
            make_goal("top", &[], Priority::P2, 0),
            make_goal("mid", &["ghost", "top"], Priority::P2, 0),
            make_goal("leaf", &["mid"], Priority::P2, 0),
        ];
        let graph = GoalGraph::new(&goals);

        assert_eq!(goal_root(&graph, "leaf").map(|g| g.id.as_str()), Some("top"));
        assert_eq!(goal_root(&graph, "mid").map(|g| g.id.as_str()), Some("top"));
        assert!(goal_root(&graph, "top").is_none());
        assert!(goal_root(&graph, "missing").is_none());
    }

    #[test]
    fn test_mutual_parents_terminate() {
        let goals = vec![
            make_goal("a", &["b"], Priority::P2, 0),
            make_goal("b", &["a"], Priority::P1, 0),
        ];
        let graph = GoalGraph::new(&goals);

        assert!(goal_root(&graph, "a").is_none());
        assert_eq!(effective_priority(&graph, &goals[0]), Priority::P1);

        // Both are containers of each other, so nothing is actionable
        assert!(derive_queue(&goals, &[]).is_empty());
    }

    #[test]
    fn test_self_parent_is_not_a_container() {
        let goals = vec![make_goal("loop", &["loop"], Priority::P1, 0)];
        let queue = derive_queue(&goals, &[]);

        assert_eq!(ids(&queue), vec!["loop"]);
        assert!(queue[0].root.is_none());
        assert_eq!(queue[0].effective_priority, Priority::P1);
    }

    #[test]
    fn test_dangling_parent_keeps_own_priority() {
        let goals = vec![make_goal("orphan", &["nowhere"], Priority::P1, 0)];
        let queue = derive_queue(&goals, &[]);

        assert_eq!(queue.len(), 1);
        assert!(queue[0].root.is_none());
        assert_eq!(queue[0].effective_priority, Priority::P1);
    }

    #[test]
    fn test_pin_to_front() {
        let goals = vec![
            make_goal("a", &[], Priority::P0, 0),
            make_goal("b", &[], Priority::P1, 0),
            make_goal("c", &[], Priority::P2, 0),
        ];
        let queue = derive_queue(&goals, &[]);

        let order = pin_to_front(&queue, &["c".to_string(), "nope".to_string()]);
        assert_eq!(order, vec!["c", "a", "b"]);
        assert_eq!(order_ids(&queue), vec!["a", "b", "c"]);
    }
}
