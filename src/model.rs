//! Goal graph data model
//!
//! Goals live in a flat list and reference each other by id through
//! `parent_ids`. The parent relation is a multi-parent DAG in the common
//! case, but nothing stops a user from creating a cycle or leaving a dangling
//! id behind, so every walk over it goes through [`GoalGraph`] and is guarded
//! by a visited set.
//!
//! The serialized shape uses camelCase keys (`parentIds`, `isCompleted`,
//! `subGoals`, ...) and every optional field defaults when missing or `null`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Duration given to a goal occurrence with no explicit duration
pub const DEFAULT_GOAL_DURATION: u32 = 60;

/// Duration given to a sub-goal occurrence with no explicit duration
pub const DEFAULT_SUB_GOAL_DURATION: u32 = 30;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

// =============================================================================
// Priority / Recurrence
// =============================================================================

/// Goal priority. `P0` is the most urgent; ordering follows urgency so
/// `P0 < P1 < P2`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Priority {
    P0,
    P1,
    #[default]
    P2,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::P0, Priority::P1, Priority::P2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P0" | "0" => Ok(Priority::P0),
            "P1" | "1" => Ok(Priority::P1),
            "P2" | "2" => Ok(Priority::P2),
            other => Err(format!("unknown priority '{}' (expected P0, P1 or P2)", other)),
        }
    }
}

/// How a goal repeats on the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None)
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        };
        f.write_str(s)
    }
}

impl FromStr for Recurrence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Recurrence::None),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            other => Err(format!(
                "unknown recurrence '{}' (expected none, daily, weekly or monthly)",
                other
            )),
        }
    }
}

// =============================================================================
// ScheduledTime
// =============================================================================

/// A time of day, optionally pinned to a calendar date.
///
/// Serialized as `YYYY-MM-DDTHH:MM` when dated and `HH:MM` otherwise. Only a
/// dated value can place an item on a specific day; an undated one still
/// supplies the time of day for recurring and ranged goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduledTime {
    pub date: Option<NaiveDate>,
    pub time: NaiveTime,
}

impl ScheduledTime {
    pub fn at(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date: Some(date),
            time,
        }
    }

    pub fn time_only(time: NaiveTime) -> Self {
        Self { date: None, time }
    }

    /// Minutes since midnight, seconds truncated
    pub fn minutes_from_midnight(&self) -> u32 {
        self.time.hour() * 60 + self.time.minute()
    }
}

impl fmt::Display for ScheduledTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date {
            Some(date) => write!(f, "{}T{}", date.format("%Y-%m-%d"), self.time.format("%H:%M")),
            None => write!(f, "{}", self.time.format("%H:%M")),
        }
    }
}

impl FromStr for ScheduledTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            let local = dt.naive_local();
            return Ok(Self::at(local.date(), local.time()));
        }

        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Self::at(dt.date(), dt.time()));
            }
        }

        for format in ["%H:%M:%S", "%H:%M"] {
            if let Ok(time) = NaiveTime::parse_from_str(s, format) {
                return Ok(Self::time_only(time));
            }
        }

        Err(format!(
            "invalid scheduled time '{}' (expected YYYY-MM-DDTHH:MM or HH:MM)",
            s
        ))
    }
}

impl Serialize for ScheduledTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScheduledTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Serde helpers
// =============================================================================

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `null`, missing and `""` all mean "not set"
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => s.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Goal / SubGoal
// =============================================================================

/// A checklist item owned by exactly one goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubGoal {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_time: Option<ScheduledTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl SubGoal {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            content: content.into(),
            is_completed: false,
            scheduled_time: None,
            duration: None,
        }
    }
}

/// A node in the goal graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parent_ids: Vec<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_today: bool,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_time: Option<ScheduledTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recurrence: Recurrence,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub_goals: Vec<SubGoal>,
    /// Fields owned by other consumers (canvas position and the like),
    /// carried through load/save untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Goal {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            content: content.into(),
            parent_ids: Vec::new(),
            is_completed: false,
            priority: Priority::default(),
            completed_at: None,
            created_at: Utc::now(),
            is_today: false,
            scheduled_time: None,
            duration: None,
            start_date: None,
            end_date: None,
            recurrence: Recurrence::None,
            sub_goals: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Calendar date the goal was created on (UTC)
    pub fn created_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn has_open_sub_goals(&self) -> bool {
        self.sub_goals.iter().any(|sg| !sg.is_completed)
    }

    pub fn sub_goal(&self, sub_goal_id: &str) -> Option<&SubGoal> {
        self.sub_goals.iter().find(|sg| sg.id == sub_goal_id)
    }

    pub fn sub_goal_mut(&mut self, sub_goal_id: &str) -> Option<&mut SubGoal> {
        self.sub_goals.iter_mut().find(|sg| sg.id == sub_goal_id)
    }

    /// First 8 characters of the id, for display
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

// =============================================================================
// DailyLog
// =============================================================================

/// A journal entry. Records which goal was active when it was written, with
/// a copy of that goal's text so the entry still reads right after the goal
/// is renamed or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub id: String,
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub content: String,
    /// Number of entries that existed when this one was written
    #[serde(default)]
    pub step_index: usize,
    #[serde(default)]
    pub target_goal_content: Option<String>,
    #[serde(default)]
    pub linked_goal_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DailyLog {
    pub fn new(content: impl Into<String>, step_index: usize, goal: Option<&Goal>) -> Self {
        Self {
            id: new_id(),
            date: Utc::now(),
            content: content.into(),
            step_index,
            target_goal_content: goal.map(|g| g.content.clone()),
            linked_goal_id: goal.map(|g| g.id.clone()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

// =============================================================================
// GoalGraph - id-indexed view over a goal snapshot
// =============================================================================

/// Read-only index over a borrowed goal list.
///
/// Lookups that miss (dangling parent ids) are simply skipped. When the same
/// id appears twice the first record wins.
#[derive(Debug, Clone)]
pub struct GoalGraph<'a> {
    goals: &'a [Goal],
    index: HashMap<&'a str, usize>,
    children: HashMap<&'a str, Vec<usize>>,
}

impl<'a> GoalGraph<'a> {
    pub fn new(goals: &'a [Goal]) -> Self {
        let mut index = HashMap::with_capacity(goals.len());
        let mut children: HashMap<&'a str, Vec<usize>> = HashMap::new();

        for (i, goal) in goals.iter().enumerate() {
            index.entry(goal.id.as_str()).or_insert(i);
            for pid in &goal.parent_ids {
                children.entry(pid.as_str()).or_default().push(i);
            }
        }

        Self {
            goals,
            index,
            children,
        }
    }

    pub fn goals(&self) -> &'a [Goal] {
        self.goals
    }

    pub fn get(&self, id: &str) -> Option<&'a Goal> {
        self.index.get(id).map(|&i| &self.goals[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Parents of a goal that exist in this snapshot, in `parent_ids` order
    pub fn parents(&self, goal: &Goal) -> Vec<&'a Goal> {
        goal.parent_ids.iter().filter_map(|pid| self.get(pid)).collect()
    }

    /// First existing parent of a goal
    pub fn first_parent(&self, goal: &Goal) -> Option<&'a Goal> {
        goal.parent_ids.iter().find_map(|pid| self.get(pid))
    }

    /// Goals naming `id` as a parent
    pub fn children(&self, id: &str) -> Vec<&'a Goal> {
        self.children
            .get(id)
            .map(|idxs| idxs.iter().map(|&i| &self.goals[i]).collect())
            .unwrap_or_default()
    }

    /// Goals with no existing parent
    pub fn root_goals(&self) -> Vec<&'a Goal> {
        self.goals
            .iter()
            .filter(|g| self.first_parent(g).is_none())
            .collect()
    }

    /// The goal and everything below it (BFS, visited-guarded)
    pub fn subtree_ids(&self, root_id: &str) -> Vec<&'a str> {
        let mut result = Vec::new();
        let Some(root) = self.get(root_id) else {
            return result;
        };

        let mut visited: HashSet<&'a str> = HashSet::new();
        let mut queue = VecDeque::from([root]);
        visited.insert(root.id.as_str());

        while let Some(goal) = queue.pop_front() {
            result.push(goal.id.as_str());
            for child in self.children(&goal.id) {
                if visited.insert(child.id.as_str()) {
                    queue.push_back(child);
                }
            }
        }

        result
    }

    /// Every goal reachable upward from `id`, excluding itself
    pub fn ancestors(&self, id: &str) -> Vec<&'a str> {
        let mut result = Vec::new();
        let Some(start) = self.get(id) else {
            return result;
        };

        let mut visited: HashSet<&'a str> = HashSet::from([start.id.as_str()]);
        let mut stack = vec![start];

        while let Some(goal) = stack.pop() {
            for parent in self.parents(goal) {
                if visited.insert(parent.id.as_str()) {
                    result.push(parent.id.as_str());
                    stack.push(parent);
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(id: &str, parents: &[&str]) -> Goal {
        let mut g = Goal::new(format!("Goal {}", id));
        g.id = id.to_string();
        g.parent_ids = parents.iter().map(|p| p.to_string()).collect();
        g
    }

    #[test]
    fn test_priority_order() {
        assert!(Priority::P0 < Priority::P1);
        assert!(Priority::P1 < Priority::P2);
        assert_eq!("p1".parse::<Priority>(), Ok(Priority::P1));
        assert!("P3".parse::<Priority>().is_err());
    }

    #[test]
    fn test_scheduled_time_parse() {
        let dated: ScheduledTime = "2024-03-05T14:30".parse().unwrap();
        assert_eq!(dated.date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(dated.minutes_from_midnight(), 14 * 60 + 30);
        assert_eq!(dated.to_string(), "2024-03-05T14:30");

        let with_seconds: ScheduledTime = "2024-03-05T09:15:00".parse().unwrap();
        assert_eq!(with_seconds.minutes_from_midnight(), 9 * 60 + 15);

        let undated: ScheduledTime = "07:05".parse().unwrap();
        assert_eq!(undated.date, None);
        assert_eq!(undated.to_string(), "07:05");

        assert!("tomorrow".parse::<ScheduledTime>().is_err());
    }

    #[test]
    fn test_goal_tolerates_missing_fields() {
        let json = r#"{
            "id": "a",
            "content": "Learn Rust",
            "createdAt": "2024-01-01T10:00:00.000Z",
            "position": {"x": 10, "y": 20},
            "recurrence": null,
            "startDate": "",
            "scheduledTime": null
        }"#;
        let goal: Goal = serde_json::from_str(json).unwrap();

        assert!(goal.parent_ids.is_empty());
        assert_eq!(goal.priority, Priority::P2);
        assert_eq!(goal.recurrence, Recurrence::None);
        assert_eq!(goal.start_date, None);
        assert!(goal.sub_goals.is_empty());
        assert_eq!(goal.extra["position"]["x"], 10);

        let back = serde_json::to_value(&goal).unwrap();
        assert_eq!(back["position"]["y"], 20);
        assert_eq!(back["parentIds"], serde_json::json!([]));
    }

    #[test]
    fn test_graph_skips_dangling_parents() {
        let goals = vec![goal("a", &[]), goal("b", &["a", "ghost"])];
        let graph = GoalGraph::new(&goals);

        let b = graph.get("b").unwrap();
        let parents: Vec<&str> = graph.parents(b).iter().map(|g| g.id.as_str()).collect();
        assert_eq!(parents, vec!["a"]);

        let roots: Vec<&str> = graph.root_goals().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(roots, vec!["a"]);
    }

    #[test]
    fn test_subtree_and_ancestors_survive_cycles() {
        let goals = vec![goal("a", &["c"]), goal("b", &["a"]), goal("c", &["b"])];
        let graph = GoalGraph::new(&goals);

        let mut subtree = graph.subtree_ids("a");
        subtree.sort();
        assert_eq!(subtree, vec!["a", "b", "c"]);

        let mut ancestors = graph.ancestors("a");
        ancestors.sort();
        assert_eq!(ancestors, vec!["b", "c"]);
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_daily_log_reads_saved_shape() {
        let log: DailyLog = serde_json::from_str(
            r#"{"id": "l1", "date": "2024-05-01T08:30:00.000Z", "content": "Ran 3k",
                "stepIndex": 4, "targetGoalContent": null, "linkedGoalId": null, "mood": "good"}"#,
        )
        .unwrap();

        assert_eq!(log.step_index, 4);
        assert_eq!(log.target_goal_content, None);
        assert_eq!(log.extra["mood"], "good");
        assert_eq!(log.date.to_rfc3339(), "2024-05-01T08:30:00+00:00");
    }
}
