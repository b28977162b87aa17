//! Ascension - goal tracking with a derived task queue and a day planner
//!
//! Goals form a multi-parent graph. Everything you see is derived from that
//! graph on demand:
//!
//! | Derivation | What it answers |
//! |------------|-----------------|
//! | [`derive_queue`] | Which goals can I work on right now, in what order? |
//! | [`project`] | What falls on this calendar date? |
//! | [`layout`] | How do the timed items of a day sit side by side? |
//!
//! # Quick Start
//!
//! ```
//! use ascension::{derive_queue, GoalStore};
//!
//! let mut store = GoalStore::new();
//! let trip = store.add_goal("Plan the trip", None).unwrap();
//! store.add_goal("Book flights", Some(&trip)).unwrap();
//!
//! // The parent is a container while its child is open
//! let queue = derive_queue(store.goals(), &store.task_order);
//! assert_eq!(queue.len(), 1);
//! assert_eq!(queue[0].goal.content, "Book flights");
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod init;
pub mod layout;
pub mod model;
pub mod persist;
pub mod queue;
pub mod schedule;
pub mod store;

pub use config::Config;
pub use error::{Result, StoreError};
pub use export::{filter_goals_from_roots, graph_to_dot, DotConfig};
pub use layout::{layout, timed_occurrences, PositionedOccurrence, TimedOccurrence, ViewWindow};
pub use model::{DailyLog, Goal, GoalGraph, Priority, Recurrence, ScheduledTime, SubGoal};
pub use persist::{ExportDocument, StateFile, CURRENT_VERSION};
pub use queue::{derive_queue, TaskItem};
pub use schedule::{
    agenda, occurs_on, project, AgendaOptions, CompletionFilter, DayAgenda, Occurrence,
    OccurrenceKind, OccurrenceTag,
};
pub use store::{GoalPatch, GoalStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify core types are re-exported from crate root
        assert_eq!(CURRENT_VERSION, 10);
        assert_eq!(ViewWindow::default(), ViewWindow::from_hours(6, 24));
    }
}
