//! DOT export for goal graphs
//!
//! Goals become nodes, `parent_ids` become parent -> child edges. Render with
//! `dot -Tpng goals.dot -o goals.png`.

use crate::model::{Goal, GoalGraph, Priority};
use crate::queue::container_ids;
use std::collections::HashSet;
use std::fmt::{self, Write};

/// Configuration for DOT export
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Title for the graph
    pub title: Option<String>,
    /// Include short ids in labels
    pub show_ids: bool,
    /// Include priority in labels
    pub show_priority: bool,
    /// Orientation: "TB" (top-bottom), "LR" (left-right)
    pub rankdir: String,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            title: None,
            show_ids: true,
            show_priority: true,
            rankdir: "TB".to_string(),
        }
    }
}

/// Node shape by role in the graph
fn node_shape(goal: &Goal, is_container: bool) -> &'static str {
    if goal.is_completed {
        "ellipse"
    } else if is_container {
        "house"
    } else {
        "box"
    }
}

/// Fill colour by priority; completed goals are greyed out
fn node_color(goal: &Goal) -> &'static str {
    if goal.is_completed {
        return "#DCDCDC"; // Gainsboro
    }
    match goal.priority {
        Priority::P0 => "#FFB6C1", // Light pink
        Priority::P1 => "#FFE4B5", // Moccasin
        Priority::P2 => "#E0FFFF", // Light cyan
    }
}

/// Escape a string for DOT labels
fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Truncate to `max_chars` characters
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Convert goals to DOT format
pub fn graph_to_dot(goals: &[Goal], config: &DotConfig) -> String {
    let mut dot = String::new();
    // Writing into a String cannot fail
    let _ = write_dot(&mut dot, goals, config);
    dot
}

fn write_dot<W: Write>(out: &mut W, goals: &[Goal], config: &DotConfig) -> fmt::Result {
    let graph = GoalGraph::new(goals);
    let containers = container_ids(goals);

    writeln!(out, "digraph Goals {{")?;
    writeln!(out, "  rankdir={};", config.rankdir)?;
    writeln!(out, "  node [fontname=\"Arial\" fontsize=10];")?;

    if let Some(title) = &config.title {
        writeln!(out, "  label=\"{}\";", escape_dot(title))?;
        writeln!(out, "  labelloc=t;")?;
        writeln!(out, "  fontsize=14;")?;
    }
    writeln!(out)?;

    for goal in goals {
        let mut label = String::new();
        if config.show_ids {
            write!(label, "[{}] ", goal.short_id())?;
        }
        label.push_str(&truncate(&goal.content, 40));
        if config.show_priority && !goal.is_completed {
            write!(label, "\n({})", goal.priority)?;
        }

        writeln!(
            out,
            "  \"{}\" [label=\"{}\" shape=\"{}\" fillcolor=\"{}\" style=\"filled\"];",
            escape_dot(&goal.id),
            escape_dot(&label),
            node_shape(goal, containers.contains(goal.id.as_str())),
            node_color(goal)
        )?;
    }

    writeln!(out)?;

    for goal in goals {
        for parent in graph.parents(goal) {
            let style = if goal.is_completed { "dashed" } else { "solid" };
            writeln!(
                out,
                "  \"{}\" -> \"{}\" [style=\"{}\"];",
                escape_dot(&parent.id),
                escape_dot(&goal.id),
                style
            )?;
        }
    }

    writeln!(out, "}}")
}

/// Keep only the given roots and everything below them
pub fn filter_goals_from_roots(goals: &[Goal], root_ids: &[String]) -> Vec<Goal> {
    let graph = GoalGraph::new(goals);
    let reachable: HashSet<&str> = root_ids
        .iter()
        .flat_map(|id| graph.subtree_ids(id))
        .collect();

    goals
        .iter()
        .filter(|g| reachable.contains(g.id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_goals() -> Vec<Goal> {
        let mut goals = Vec::new();
        for (id, parents, done) in [
            ("root", vec![], false),
            ("child", vec!["root", "ghost"], false),
            ("done", vec!["root"], true),
            ("other", vec![], false),
        ] {
            let mut g = Goal::new(format!("Goal \"{}\"", id));
            g.id = id.to_string();
            g.parent_ids = parents.into_iter().map(String::from).collect();
            g.is_completed = done;
            goals.push(g);
        }
        goals[0].priority = Priority::P0;
        goals
    }

    #[test]
    fn test_graph_to_dot() {
        let dot = graph_to_dot(&sample_goals(), &DotConfig::default());

        assert!(dot.contains("digraph Goals"));
        assert!(dot.contains("\"root\" [label=\"[root] Goal \\\"root\\\"\\n(P0)\" shape=\"house\""));
        assert!(dot.contains("\"child\" [label=\"[child] Goal \\\"child\\\"\\n(P2)\" shape=\"box\""));
        assert!(dot.contains("\"done\" [label=\"[done] Goal \\\"done\\\"\" shape=\"ellipse\""));
        assert!(dot.contains("\"root\" -> \"child\" [style=\"solid\"]"));
        assert!(dot.contains("\"root\" -> \"done\" [style=\"dashed\"]"));
        assert!(!dot.contains("ghost"));
    }

    #[test]
    fn test_filter_goals() {
        let filtered = filter_goals_from_roots(&sample_goals(), &["root".to_string()]);
        let ids: Vec<&str> = filtered.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "child", "done"]);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 40), "short");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
    }
}
