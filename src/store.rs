//! Goal store: the owned goal list plus the user's queue order and the
//! currently active goal.
//!
//! Every mutation edits the flat `Vec<Goal>` in place. Nothing derived (queue,
//! calendar, layout) is cached here; callers recompute from [`GoalStore::goals`]
//! after each change.

use crate::error::{Result, StoreError};
use crate::model::{
    DailyLog, Goal, GoalGraph, Priority, Recurrence, ScheduledTime, SubGoal,
    DEFAULT_GOAL_DURATION, DEFAULT_SUB_GOAL_DURATION,
};
use crate::queue::{derive_queue, pin_to_front, TaskItem};
use chrono::{NaiveDate, Utc};

/// Field-level update for [`GoalStore::update_goal`]. `None` leaves a field
/// alone; the nested options on clearable fields set or clear them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalPatch {
    pub content: Option<String>,
    pub priority: Option<Priority>,
    pub recurrence: Option<Recurrence>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub duration: Option<Option<u32>>,
    pub is_today: Option<bool>,
}

impl GoalPatch {
    pub fn is_empty(&self) -> bool {
        *self == GoalPatch::default()
    }

    fn apply(self, goal: &mut Goal) {
        if let Some(content) = self.content {
            goal.content = content;
        }
        if let Some(priority) = self.priority {
            goal.priority = priority;
        }
        if let Some(recurrence) = self.recurrence {
            goal.recurrence = recurrence;
        }
        if let Some(start) = self.start_date {
            goal.start_date = start;
        }
        if let Some(end) = self.end_date {
            goal.end_date = end;
        }
        if let Some(duration) = self.duration {
            goal.duration = duration;
        }
        if let Some(is_today) = self.is_today {
            goal.is_today = is_today;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GoalStore {
    pub goals: Vec<Goal>,
    /// Goal ids the user pinned to the front of the queue, in order
    pub task_order: Vec<String>,
    pub active_goal_id: Option<String>,
    /// Journal entries, oldest first
    pub daily_logs: Vec<DailyLog>,
    /// Priority given to newly added goals
    pub default_priority: Priority,
    /// Top-level state fields this crate does not interpret, kept for saving
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GoalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_priority(mut self, priority: Priority) -> Self {
        self.default_priority = priority;
        self
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn graph(&self) -> GoalGraph<'_> {
        GoalGraph::new(&self.goals)
    }

    pub fn get(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    fn goal_mut(&mut self, id: &str) -> Result<&mut Goal> {
        self.goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| StoreError::GoalNotFound(id.to_string()))
    }

    fn require(&self, id: &str) -> Result<&Goal> {
        self.get(id)
            .ok_or_else(|| StoreError::GoalNotFound(id.to_string()))
    }

    pub fn active_goal(&self) -> Option<&Goal> {
        self.active_goal_id.as_deref().and_then(|id| self.get(id))
    }

    /// Current task queue
    pub fn queue(&self) -> Vec<TaskItem<'_>> {
        derive_queue(&self.goals, &self.task_order)
    }

    /// Resolve a full id or a unique id prefix to the full id
    pub fn resolve_id(&self, prefix: &str) -> Result<String> {
        if self.get(prefix).is_some() {
            return Ok(prefix.to_string());
        }

        let mut matches: Vec<String> = self
            .goals
            .iter()
            .filter(|g| g.id.starts_with(prefix))
            .map(|g| g.id.clone())
            .collect();

        match matches.len() {
            0 => Err(StoreError::GoalNotFound(prefix.to_string())),
            1 => Ok(matches.swap_remove(0)),
            _ => Err(StoreError::AmbiguousId {
                prefix: prefix.to_string(),
                matches,
            }),
        }
    }

    /// Same as [`resolve_id`](Self::resolve_id) for a sub-goal of `goal_id`
    pub fn resolve_sub_goal_id(&self, goal_id: &str, prefix: &str) -> Result<String> {
        let goal = self.require(goal_id)?;
        if goal.sub_goal(prefix).is_some() {
            return Ok(prefix.to_string());
        }

        let mut matches: Vec<String> = goal
            .sub_goals
            .iter()
            .filter(|sg| sg.id.starts_with(prefix))
            .map(|sg| sg.id.clone())
            .collect();

        match matches.len() {
            0 => Err(StoreError::SubGoalNotFound {
                goal_id: goal_id.to_string(),
                sub_goal_id: prefix.to_string(),
            }),
            1 => Ok(matches.swap_remove(0)),
            _ => Err(StoreError::AmbiguousId {
                prefix: prefix.to_string(),
                matches,
            }),
        }
    }

    // =========================================================================
    // Goals
    // =========================================================================

    /// Add a goal, optionally under an existing parent. Returns the new id.
    pub fn add_goal(&mut self, content: impl Into<String>, parent_id: Option<&str>) -> Result<String> {
        if let Some(pid) = parent_id {
            if self.get(pid).is_none() {
                return Err(StoreError::ParentNotFound(pid.to_string()));
            }
        }

        let mut goal = Goal::new(content);
        goal.priority = self.default_priority;
        if let Some(pid) = parent_id {
            goal.parent_ids.push(pid.to_string());
        }

        let id = goal.id.clone();
        let first = self.goals.is_empty();
        tracing::info!(goal_id = %id, parent = ?parent_id, "created goal");
        self.goals.push(goal);

        if first && self.active_goal_id.is_none() {
            self.active_goal_id = Some(id.clone());
        }
        Ok(id)
    }

    pub fn update_goal(&mut self, id: &str, patch: GoalPatch) -> Result<()> {
        let goal = self.goal_mut(id)?;
        tracing::debug!(goal_id = %id, ?patch, "updating goal");
        patch.apply(goal);
        Ok(())
    }

    /// Remove a goal and every reference to it. Children keep their other
    /// parents; a child whose only parent was removed becomes a root.
    pub fn delete_goal(&mut self, id: &str) -> Result<()> {
        let before = self.goals.len();
        self.goals.retain(|g| g.id != id);
        if self.goals.len() == before {
            return Err(StoreError::GoalNotFound(id.to_string()));
        }

        for goal in &mut self.goals {
            goal.parent_ids.retain(|pid| pid != id);
        }
        self.task_order.retain(|tid| tid != id);
        if self.active_goal_id.as_deref() == Some(id) {
            self.active_goal_id = None;
        }

        tracing::info!(goal_id = %id, "deleted goal");
        Ok(())
    }

    /// Add `parent_id` as a parent of `id`. Linking twice is a no-op.
    pub fn link_goal(&mut self, id: &str, parent_id: &str) -> Result<()> {
        if self.get(parent_id).is_none() {
            return Err(StoreError::ParentNotFound(parent_id.to_string()));
        }
        let goal = self.goal_mut(id)?;
        if !goal.parent_ids.iter().any(|pid| pid == parent_id) {
            goal.parent_ids.push(parent_id.to_string());
            tracing::debug!(goal_id = %id, parent = %parent_id, "linked goal");
        }
        Ok(())
    }

    /// Drop every parent edge of `id`
    pub fn unlink_goal(&mut self, id: &str) -> Result<()> {
        let goal = self.goal_mut(id)?;
        goal.parent_ids.clear();
        tracing::debug!(goal_id = %id, "unlinked goal");
        Ok(())
    }

    /// Make a goal the active one, reopening it if it was done. `None`
    /// clears the active goal.
    pub fn set_active_goal(&mut self, id: Option<&str>) -> Result<()> {
        match id {
            Some(id) => {
                let goal = self.goal_mut(id)?;
                goal.is_completed = false;
                goal.completed_at = None;
                self.active_goal_id = Some(id.to_string());
            }
            None => self.active_goal_id = None,
        }
        Ok(())
    }

    /// Mark a goal done. Refused while any of its sub-goals is open.
    ///
    /// Focus moves up to the goal's first existing parent. Without one, the
    /// active goal is cleared if it was this goal and kept otherwise.
    pub fn complete_goal(&mut self, id: &str) -> Result<()> {
        let goal = self.require(id)?;
        if goal.has_open_sub_goals() {
            return Err(StoreError::IncompleteSubGoals(id.to_string()));
        }
        let next_active = self.graph().first_parent(goal).map(|p| p.id.clone());

        let goal = self.goal_mut(id)?;
        goal.is_completed = true;
        goal.completed_at = Some(Utc::now());

        match next_active {
            Some(parent) => self.active_goal_id = Some(parent),
            None if self.active_goal_id.as_deref() == Some(id) => self.active_goal_id = None,
            None => {}
        }

        tracing::info!(goal_id = %id, active = ?self.active_goal_id, "completed goal");
        Ok(())
    }

    pub fn reopen_goal(&mut self, id: &str) -> Result<()> {
        let goal = self.goal_mut(id)?;
        goal.is_completed = false;
        goal.completed_at = None;
        tracing::info!(goal_id = %id, "reopened goal");
        Ok(())
    }

    pub fn set_goal_priority(&mut self, id: &str, priority: Priority) -> Result<()> {
        self.goal_mut(id)?.priority = priority;
        Ok(())
    }

    /// Flip the "today" flag; returns the new value
    pub fn toggle_goal_today(&mut self, id: &str) -> Result<bool> {
        let goal = self.goal_mut(id)?;
        goal.is_today = !goal.is_today;
        Ok(goal.is_today)
    }

    /// Set or clear a goal's time slot. Duration falls back to one hour when
    /// a time is set without one.
    pub fn set_goal_schedule(
        &mut self,
        id: &str,
        time: Option<ScheduledTime>,
        duration: Option<u32>,
    ) -> Result<()> {
        let goal = self.goal_mut(id)?;
        goal.scheduled_time = time;
        goal.duration = time.map(|_| duration.unwrap_or(DEFAULT_GOAL_DURATION));
        tracing::debug!(goal_id = %id, time = ?goal.scheduled_time, "scheduled goal");
        Ok(())
    }

    // =========================================================================
    // Sub-goals
    // =========================================================================

    pub fn add_sub_goal(&mut self, goal_id: &str, content: impl Into<String>) -> Result<String> {
        let goal = self.goal_mut(goal_id)?;
        let sub = SubGoal::new(content);
        let id = sub.id.clone();
        goal.sub_goals.push(sub);
        tracing::debug!(goal_id = %goal_id, sub_goal_id = %id, "added sub-goal");
        Ok(id)
    }

    fn sub_goal_mut(&mut self, goal_id: &str, sub_goal_id: &str) -> Result<&mut SubGoal> {
        self.goal_mut(goal_id)?
            .sub_goal_mut(sub_goal_id)
            .ok_or_else(|| StoreError::SubGoalNotFound {
                goal_id: goal_id.to_string(),
                sub_goal_id: sub_goal_id.to_string(),
            })
    }

    /// Flip a sub-goal's completion; returns the new value
    pub fn toggle_sub_goal(&mut self, goal_id: &str, sub_goal_id: &str) -> Result<bool> {
        let sub = self.sub_goal_mut(goal_id, sub_goal_id)?;
        sub.is_completed = !sub.is_completed;
        Ok(sub.is_completed)
    }

    pub fn delete_sub_goal(&mut self, goal_id: &str, sub_goal_id: &str) -> Result<()> {
        let goal = self.goal_mut(goal_id)?;
        let before = goal.sub_goals.len();
        goal.sub_goals.retain(|sg| sg.id != sub_goal_id);
        if goal.sub_goals.len() == before {
            return Err(StoreError::SubGoalNotFound {
                goal_id: goal_id.to_string(),
                sub_goal_id: sub_goal_id.to_string(),
            });
        }
        Ok(())
    }

    /// Reorder sub-goals. Listed ids come first in the given order; unlisted
    /// sub-goals keep their relative order after them. Unknown ids are ignored.
    pub fn reorder_sub_goals(&mut self, goal_id: &str, ordered_ids: &[String]) -> Result<()> {
        let goal = self.goal_mut(goal_id)?;
        let mut rest = std::mem::take(&mut goal.sub_goals);
        let mut ordered = Vec::with_capacity(rest.len());

        for id in ordered_ids {
            if let Some(pos) = rest.iter().position(|sg| &sg.id == id) {
                ordered.push(rest.remove(pos));
            }
        }
        ordered.extend(rest);
        goal.sub_goals = ordered;
        Ok(())
    }

    /// Put a sub-goal on the calendar. Duration defaults to 30 minutes.
    pub fn schedule_sub_goal(
        &mut self,
        goal_id: &str,
        sub_goal_id: &str,
        time: ScheduledTime,
        duration: Option<u32>,
    ) -> Result<()> {
        let sub = self.sub_goal_mut(goal_id, sub_goal_id)?;
        sub.scheduled_time = Some(time);
        sub.duration = Some(duration.unwrap_or(DEFAULT_SUB_GOAL_DURATION));
        Ok(())
    }

    pub fn unschedule_sub_goal(&mut self, goal_id: &str, sub_goal_id: &str) -> Result<()> {
        let sub = self.sub_goal_mut(goal_id, sub_goal_id)?;
        sub.scheduled_time = None;
        sub.duration = None;
        Ok(())
    }

    // =========================================================================
    // Queue order
    // =========================================================================

    pub fn set_task_order(&mut self, ids: Vec<String>) {
        self.task_order = ids;
    }

    /// Move `ids` to the front of the current queue and store the full
    /// resulting id sequence as the custom order
    pub fn update_order(&mut self, ids: &[String]) {
        let order = pin_to_front(&self.queue(), ids);
        tracing::debug!(pinned = ids.len(), total = order.len(), "updated task order");
        self.task_order = order;
    }

    // =========================================================================
    // Daily log
    // =========================================================================

    pub fn daily_logs(&self) -> &[DailyLog] {
        &self.daily_logs
    }

    /// Entries written while `goal_id` was the active goal
    pub fn logs_for_goal(&self, goal_id: &str) -> Vec<&DailyLog> {
        self.daily_logs
            .iter()
            .filter(|log| log.linked_goal_id.as_deref() == Some(goal_id))
            .collect()
    }

    /// Append a journal entry tied to the active goal. Returns the new id.
    pub fn add_daily_log(&mut self, content: impl Into<String>) -> String {
        let log = DailyLog::new(content, self.daily_logs.len(), self.active_goal());
        let id = log.id.clone();
        tracing::info!(log_id = %id, goal_id = ?log.linked_goal_id, "added log entry");
        self.daily_logs.push(log);
        id
    }

    /// Replace the text of an entry. Its goal link and snapshot stay as written.
    pub fn update_daily_log(&mut self, id: &str, content: impl Into<String>) -> Result<()> {
        let log = self
            .daily_logs
            .iter_mut()
            .find(|log| log.id == id)
            .ok_or_else(|| StoreError::LogNotFound(id.to_string()))?;
        log.content = content.into();
        Ok(())
    }

    pub fn delete_daily_log(&mut self, id: &str) -> Result<()> {
        let before = self.daily_logs.len();
        self.daily_logs.retain(|log| log.id != id);
        if self.daily_logs.len() == before {
            return Err(StoreError::LogNotFound(id.to_string()));
        }
        tracing::info!(log_id = %id, "deleted log entry");
        Ok(())
    }

    /// Resolve a full log id or a unique prefix
    pub fn resolve_log_id(&self, prefix: &str) -> Result<String> {
        if self.daily_logs.iter().any(|log| log.id == prefix) {
            return Ok(prefix.to_string());
        }

        let mut matches: Vec<String> = self
            .daily_logs
            .iter()
            .filter(|log| log.id.starts_with(prefix))
            .map(|log| log.id.clone())
            .collect();

        match matches.len() {
            0 => Err(StoreError::LogNotFound(prefix.to_string())),
            1 => Ok(matches.swap_remove(0)),
            _ => Err(StoreError::AmbiguousId {
                prefix: prefix.to_string(),
                matches,
            }),
        }
    }

    // =========================================================================
    // Tree helpers
    // =========================================================================

    pub fn root_goals(&self) -> Vec<&Goal> {
        self.graph().root_goals()
    }

    pub fn children_of(&self, id: &str) -> Vec<&Goal> {
        self.graph().children(id)
    }

    pub fn subtree_ids(&self, id: &str) -> Vec<&str> {
        self.graph().subtree_ids(id)
    }

    pub fn ancestors(&self, id: &str) -> Vec<&str> {
        self.graph().ancestors(id)
    }
}
