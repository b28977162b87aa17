//! JSON state file and export/import documents
//!
//! The state file is a single JSON object:
//!
//! ```json
//! { "version": 10, "goals": [...], "activeGoalId": "...", "taskOrder": [...] }
//! ```
//!
//! Older files are upgraded in place on load, on the raw JSON value, before
//! the typed decode. A file wrapped as `{ "state": {...}, "version": N }` is
//! unwrapped first. Top-level keys this crate does not know are kept and
//! written back untouched.

use crate::config::{find_in_ancestors, ASCENSION_DIR};
use crate::error::{Result, StoreError};
use crate::model::{DailyLog, Goal};
use crate::store::GoalStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Version written to the state file
pub const CURRENT_VERSION: u32 = 10;

/// Version string written to export documents
pub const EXPORT_VERSION: &str = "2.1";

/// Env var overriding the state file location
pub const DATA_PATH_ENV: &str = "ASCENSION_DATA_PATH";

const STATE_FILE: &str = "state.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateFile {
    pub version: u32,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub active_goal_id: Option<String>,
    #[serde(default)]
    pub task_order: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub daily_logs: Vec<DailyLog>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StateFile {
    pub fn from_store(store: &GoalStore) -> Self {
        Self {
            version: CURRENT_VERSION,
            goals: store.goals.clone(),
            active_goal_id: store.active_goal_id.clone(),
            task_order: store.task_order.clone(),
            daily_logs: store.daily_logs.clone(),
            extra: store.extra.clone(),
        }
    }

    pub fn into_store(self) -> GoalStore {
        GoalStore {
            goals: self.goals,
            task_order: self.task_order,
            active_goal_id: self.active_goal_id,
            daily_logs: self.daily_logs,
            extra: self.extra,
            ..GoalStore::default()
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<DailyLog>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<DailyLog>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Resolve where the state file lives.
///
/// `ASCENSION_DATA_PATH` wins, then `.ascension/state.json` in the current
/// directory or any ancestor, then `./.ascension/state.json`.
pub fn state_path() -> PathBuf {
    if let Ok(path) = std::env::var(DATA_PATH_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    find_in_ancestors(STATE_FILE).unwrap_or_else(|| PathBuf::from(ASCENSION_DIR).join(STATE_FILE))
}

/// Load the store from `path`. A missing file is an empty store.
pub fn load(path: &Path) -> Result<GoalStore> {
    tracing::debug!(path = %path.display(), "loading state");
    if !path.exists() {
        return Ok(GoalStore::new());
    }

    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(GoalStore::new());
    }

    let raw: Value = serde_json::from_str(&contents)?;
    let state: StateFile = serde_json::from_value(migrate(raw)?)?;
    Ok(state.into_store())
}

/// Write the store to `path`, creating parent directories as needed
pub fn save(path: &Path, store: &GoalStore) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(&StateFile::from_store(store))?;
    // Write to a sibling temp file first so a crash never leaves half a file
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;

    tracing::debug!(path = %path.display(), goals = store.goals.len(), "saved state");
    Ok(())
}

// =============================================================================
// Migrations
// =============================================================================

/// Upgrade a raw state value of any known version to [`CURRENT_VERSION`]
pub fn migrate(raw: Value) -> Result<Value> {
    let (mut state, version) = unwrap_envelope(raw)?;

    if version > CURRENT_VERSION {
        return Err(StoreError::UnsupportedVersion(version));
    }

    if version <= 2 {
        tracing::info!(from = version, "migrating legacy goal shape");
        migrate_legacy_goals(&mut state);
    }
    if version <= 3 {
        tracing::info!("migrating: default priorities");
        for goal in goals_mut(&mut state) {
            if goal.get("priority").map_or(true, Value::is_null) {
                goal.insert("priority".to_string(), json!("P2"));
            }
        }
    }
    if version <= 4 {
        tracing::info!("migrating: task order");
        if state.get("taskOrder").map_or(true, Value::is_null) {
            state.insert("taskOrder".to_string(), json!([]));
        }
    }

    state.insert("version".to_string(), json!(CURRENT_VERSION));
    Ok(Value::Object(state))
}

/// Split off the `{ state, version }` wrapper if present and read the version
fn unwrap_envelope(raw: Value) -> Result<(Map<String, Value>, u32)> {
    let Value::Object(mut outer) = raw else {
        return Err(StoreError::InvalidImport(
            "state file is not a JSON object".to_string(),
        ));
    };

    let wrapped = matches!(outer.get("state"), Some(Value::Object(_)))
        && outer.get("version").is_some_and(Value::is_u64);

    let version = outer
        .get("version")
        .and_then(Value::as_u64)
        .map(|v| v.min(u64::from(u32::MAX)) as u32)
        .unwrap_or(0);

    if wrapped {
        if let Some(Value::Object(inner)) = outer.remove("state") {
            return Ok((inner, version));
        }
    }
    Ok((outer, version))
}

fn goals_mut(state: &mut Map<String, Value>) -> impl Iterator<Item = &mut Map<String, Value>> {
    state
        .get_mut("goals")
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object_mut)
}

/// v0-2: single `parentId` becomes `parentIds`; files with no `goals` array
/// are rebuilt from `currentGoal` / `completedGoals`
fn migrate_legacy_goals(state: &mut Map<String, Value>) {
    if state.get("goals").is_some_and(Value::is_array) {
        for goal in goals_mut(state) {
            let parent = goal.remove("parentId");
            if goal.get("parentIds").map_or(true, Value::is_null) {
                let ids = match parent {
                    Some(Value::String(pid)) if !pid.is_empty() => json!([pid]),
                    _ => json!([]),
                };
                goal.insert("parentIds".to_string(), ids);
            }
        }
        return;
    }

    let now = Utc::now().to_rfc3339();
    let mut goals = Vec::new();
    let mut active = Value::Null;

    if let Some(Value::String(content)) = state.get("currentGoal") {
        if !content.is_empty() {
            let id = Uuid::new_v4().to_string();
            goals.push(json!({
                "id": id,
                "content": content,
                "parentIds": [],
                "isCompleted": false,
                "createdAt": now,
                "isToday": true,
                "priority": "P2",
            }));
            active = json!(id);
        }
    }

    if let Some(Value::Array(done)) = state.get("completedGoals") {
        for entry in done {
            let id = entry
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            let completed_at = entry.get("completedAt").cloned().unwrap_or(Value::Null);
            let created_at = match &completed_at {
                Value::String(s) => json!(s),
                _ => json!(now),
            };
            goals.push(json!({
                "id": id,
                "content": entry.get("content").cloned().unwrap_or(json!("")),
                "parentIds": [],
                "isCompleted": true,
                "completedAt": completed_at,
                "createdAt": created_at,
                "priority": "P2",
            }));
        }
    }

    state.remove("currentGoal");
    state.remove("completedGoals");
    state.insert("goals".to_string(), Value::Array(goals));
    state.insert("activeGoalId".to_string(), active);
}

// =============================================================================
// Export / import
// =============================================================================

/// Portable snapshot written by `export` and read by `import`.
///
/// Carries the same top-level keys as the state file, so fields other tools
/// keep there (scratchpad items, view settings) travel with the goals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub active_goal_id: Option<String>,
    #[serde(default)]
    pub task_order: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub daily_logs: Vec<DailyLog>,
    pub exported_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExportDocument {
    pub fn from_store(store: &GoalStore) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            goals: store.goals.clone(),
            active_goal_id: store.active_goal_id.clone(),
            task_order: store.task_order.clone(),
            daily_logs: store.daily_logs.clone(),
            exported_at: Utc::now(),
            extra: store.extra.clone(),
        }
    }
}

pub fn export_json(store: &GoalStore) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ExportDocument::from_store(store))?)
}

/// Keys of an export document that are not carried over as extra state.
/// `currentGoal` and `completedGoals` are the legacy summary some exporters
/// add next to `goals`.
const IMPORT_CONSUMED_KEYS: [&str; 8] = [
    "version",
    "goals",
    "activeGoalId",
    "taskOrder",
    "dailyLogs",
    "exportedAt",
    "currentGoal",
    "completedGoals",
];

/// Replace the store contents with an exported document.
///
/// The document must carry a `goals` array; everything else is optional.
/// Unknown top-level keys replace the store's extra state.
pub fn import_json(store: &mut GoalStore, json: &str) -> Result<()> {
    let raw: Value = serde_json::from_str(json)?;
    let Value::Object(mut doc) = raw else {
        return Err(StoreError::InvalidImport(
            "document is not a JSON object".to_string(),
        ));
    };
    let goals = match doc.remove("goals") {
        Some(goals @ Value::Array(_)) => serde_json::from_value::<Vec<Goal>>(goals)?,
        _ => {
            return Err(StoreError::InvalidImport(
                "document has no goals array".to_string(),
            ))
        }
    };

    let active_goal_id = doc
        .get("activeGoalId")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let task_order: Vec<String> = match doc.remove("taskOrder") {
        Some(order @ Value::Array(_)) => serde_json::from_value(order)?,
        _ => Vec::new(),
    };
    let daily_logs: Vec<DailyLog> = match doc.remove("dailyLogs") {
        Some(logs @ Value::Array(_)) => serde_json::from_value(logs)?,
        _ => Vec::new(),
    };
    for key in IMPORT_CONSUMED_KEYS {
        doc.remove(key);
    }

    tracing::info!(goals = goals.len(), logs = daily_logs.len(), "imported goals");
    store.goals = goals;
    store.active_goal_id = active_goal_id;
    store.task_order = task_order;
    store.daily_logs = daily_logs;
    store.extra = doc;
    Ok(())
}
