//! Calendar projection of goals and sub-goals
//!
//! Decides which goals occur on a given date and at what time. Each goal is
//! placed by exactly one scheduling mode, picked in this order:
//!
//! 1. recurrence (daily / weekly / monthly, counted from the creation date)
//! 2. date range (`start_date ..= end_date`, open ended without `end_date`)
//! 3. a single dated `scheduled_time`
//!
//! A goal that has a mode but does not match the date is not tried against
//! the later modes. Sub-goals only ever use mode 3.

use crate::model::{
    Goal, Recurrence, SubGoal, DEFAULT_GOAL_DURATION, DEFAULT_SUB_GOAL_DURATION, MINUTES_PER_DAY,
};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceKind {
    Goal,
    Subgoal,
}

/// Why a goal landed on the date, for agenda badges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OccurrenceTag {
    Recurring,
    MultiDay,
}

/// Whether completed items are projected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionFilter {
    /// Calendar/timeline use: finished work does not occupy a slot
    #[default]
    ExcludeCompleted,
    /// Agenda/listing use
    IncludeCompleted,
}

impl CompletionFilter {
    fn admits(self, is_completed: bool) -> bool {
        match self {
            CompletionFilter::ExcludeCompleted => !is_completed,
            CompletionFilter::IncludeCompleted => true,
        }
    }
}

/// A goal or sub-goal placed on one calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence<'a> {
    pub id: &'a str,
    pub kind: OccurrenceKind,
    pub content: &'a str,
    /// Minutes from midnight; None means "anytime" on that date
    pub time_of_day: Option<u32>,
    pub duration_minutes: u32,
    pub is_completed: bool,
    pub source_goal_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_sub_goal_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<OccurrenceTag>,
}

impl Occurrence<'_> {
    pub fn has_time(&self) -> bool {
        self.time_of_day.is_some()
    }

    /// End of the time slot, capped at midnight
    pub fn end_minute(&self) -> Option<u32> {
        self.time_of_day
            .map(|start| start.saturating_add(self.duration_minutes).min(MINUTES_PER_DAY))
    }
}

/// Project every goal and sub-goal onto `date`
pub fn project(goals: &[Goal], date: NaiveDate, filter: CompletionFilter) -> Vec<Occurrence<'_>> {
    let mut occurrences = Vec::new();
    for goal in goals {
        project_goal(goal, date, filter, &mut occurrences);
    }

    tracing::trace!(%date, count = occurrences.len(), "projected occurrences");
    occurrences
}

fn project_goal<'a>(
    goal: &'a Goal,
    date: NaiveDate,
    filter: CompletionFilter,
    out: &mut Vec<Occurrence<'a>>,
) {
    if let Some(tag) = match_goal(goal, date) {
        if filter.admits(goal.is_completed) {
            out.push(Occurrence {
                id: &goal.id,
                kind: OccurrenceKind::Goal,
                content: &goal.content,
                time_of_day: goal.scheduled_time.map(|t| t.minutes_from_midnight()),
                duration_minutes: goal.duration.unwrap_or(DEFAULT_GOAL_DURATION),
                is_completed: goal.is_completed,
                source_goal_id: &goal.id,
                source_sub_goal_id: None,
                tag,
            });
        }
    }

    for sub in &goal.sub_goals {
        if let Some(occurrence) = project_sub_goal(goal, sub, date) {
            if filter.admits(occurrence.is_completed) {
                out.push(occurrence);
            }
        }
    }
}

fn project_sub_goal<'a>(goal: &'a Goal, sub: &'a SubGoal, date: NaiveDate) -> Option<Occurrence<'a>> {
    let time = sub.scheduled_time.filter(|t| t.date == Some(date))?;
    Some(Occurrence {
        id: &sub.id,
        kind: OccurrenceKind::Subgoal,
        content: &sub.content,
        time_of_day: Some(time.minutes_from_midnight()),
        duration_minutes: sub.duration.unwrap_or(DEFAULT_SUB_GOAL_DURATION),
        is_completed: sub.is_completed,
        source_goal_id: &goal.id,
        source_sub_goal_id: Some(&sub.id),
        tag: None,
    })
}

/// Whether the goal itself (not its sub-goals) falls on `date`
pub fn occurs_on(goal: &Goal, date: NaiveDate) -> bool {
    match_goal(goal, date).is_some()
}

/// `Some(tag)` when the goal occurs on `date`
fn match_goal(goal: &Goal, date: NaiveDate) -> Option<Option<OccurrenceTag>> {
    let created = goal.created_date();
    let recurring = Some(OccurrenceTag::Recurring);

    match goal.recurrence {
        Recurrence::Daily => (date >= created).then_some(recurring),
        Recurrence::Weekly => {
            (date >= created && date.weekday() == created.weekday()).then_some(recurring)
        }
        Recurrence::Monthly => {
            let day = created.day().min(last_day_of_month(date));
            (date >= created && date.day() == day).then_some(recurring)
        }
        Recurrence::None => match goal.start_date {
            Some(start) => {
                let in_range = start <= date && goal.end_date.map_or(true, |end| date <= end);
                in_range.then_some(Some(OccurrenceTag::MultiDay))
            }
            None => goal
                .scheduled_time
                .and_then(|t| t.date)
                .filter(|d| *d == date)
                .map(|_| None),
        },
    }
}

fn last_day_of_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

// =============================================================================
// Agenda
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct AgendaOptions {
    /// Leave out daily-recurring goals (and their sub-goals)
    pub hide_daily: bool,
}

/// Everything on one date, anytime items first then by start time
#[derive(Debug, Clone, Serialize)]
pub struct DayAgenda<'a> {
    pub date: NaiveDate,
    pub items: Vec<Occurrence<'a>>,
}

/// Multi-day listing starting at `from`. Completed items are kept and empty
/// days are skipped.
pub fn agenda(
    goals: &[Goal],
    from: NaiveDate,
    days: u32,
    options: AgendaOptions,
) -> Vec<DayAgenda<'_>> {
    from.iter_days()
        .take(days as usize)
        .filter_map(|date| {
            let mut items = Vec::new();
            for goal in goals {
                if options.hide_daily && goal.recurrence == Recurrence::Daily {
                    continue;
                }
                project_goal(goal, date, CompletionFilter::IncludeCompleted, &mut items);
            }
            items.sort_by_key(|o| o.time_of_day);
            (!items.is_empty()).then_some(DayAgenda { date, items })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScheduledTime;
    use chrono::{NaiveTime, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal_created(id: &str, y: i32, m: u32, d: u32) -> Goal {
        let mut g = Goal::new(format!("Goal {}", id));
        g.id = id.to_string();
        g.created_at = Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap();
        g
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> ScheduledTime {
        ScheduledTime::at(date(y, m, d), NaiveTime::from_hms_opt(h, min, 0).unwrap())
    }

    #[test]
    fn test_daily_recurrence_starts_at_creation() {
        let mut g = goal_created("d", 2024, 1, 1);
        g.recurrence = Recurrence::Daily;

        assert!(occurs_on(&g, date(2024, 1, 1)));
        assert!(occurs_on(&g, date(2024, 1, 5)));
        assert!(!occurs_on(&g, date(2023, 12, 31)));
    }

    #[test]
    fn test_weekly_recurrence_matches_weekday() {
        // 2024-01-01 is a Monday
        let mut g = goal_created("w", 2024, 1, 1);
        g.recurrence = Recurrence::Weekly;

        assert!(occurs_on(&g, date(2024, 1, 8)));
        assert!(!occurs_on(&g, date(2024, 1, 9)));
        assert!(!occurs_on(&g, date(2023, 12, 25)));
    }

    #[test]
    fn test_monthly_recurrence_clamps_to_month_end() {
        let mut g = goal_created("m", 2024, 1, 31);
        g.recurrence = Recurrence::Monthly;

        assert!(occurs_on(&g, date(2024, 2, 29)));
        assert!(occurs_on(&g, date(2024, 3, 31)));
        assert!(!occurs_on(&g, date(2024, 3, 30)));
        assert!(occurs_on(&g, date(2024, 4, 30)));
    }

    #[test]
    fn test_recurrence_ignores_date_range() {
        let mut g = goal_created("r", 2024, 1, 1);
        g.recurrence = Recurrence::Daily;
        g.start_date = Some(date(2024, 6, 1));
        g.end_date = Some(date(2024, 6, 2));

        assert!(occurs_on(&g, date(2024, 3, 1)));
    }

    #[test]
    fn test_date_range_inclusive_and_open_ended() {
        let mut g = goal_created("range", 2024, 1, 1);
        g.start_date = Some(date(2024, 2, 1));
        g.end_date = Some(date(2024, 2, 3));

        assert!(!occurs_on(&g, date(2024, 1, 31)));
        assert!(occurs_on(&g, date(2024, 2, 1)));
        assert!(occurs_on(&g, date(2024, 2, 3)));
        assert!(!occurs_on(&g, date(2024, 2, 4)));

        g.end_date = None;
        assert!(occurs_on(&g, date(2030, 1, 1)));
    }

    #[test]
    fn test_range_mode_does_not_fall_through_to_explicit_time() {
        let mut g = goal_created("x", 2024, 1, 1);
        g.start_date = Some(date(2024, 2, 1));
        g.end_date = Some(date(2024, 2, 3));
        g.scheduled_time = Some(at(2024, 3, 10, 9, 0));

        assert!(!occurs_on(&g, date(2024, 3, 10)));
    }

    #[test]
    fn test_explicit_time_single_day() {
        let mut g = goal_created("once", 2024, 1, 1);
        g.scheduled_time = Some(at(2024, 1, 10, 14, 30));

        let occ = project(std::slice::from_ref(&g), date(2024, 1, 10), CompletionFilter::default());
        assert_eq!(occ.len(), 1);
        assert_eq!(occ[0].time_of_day, Some(14 * 60 + 30));
        assert_eq!(occ[0].duration_minutes, DEFAULT_GOAL_DURATION);
        assert_eq!(occ[0].kind, OccurrenceKind::Goal);
        assert_eq!(occ[0].tag, None);

        assert!(project(&[g], date(2024, 1, 11), CompletionFilter::default()).is_empty());
    }

    #[test]
    fn test_recurring_goal_without_time_is_anytime() {
        let mut g = goal_created("anytime", 2024, 1, 1);
        g.recurrence = Recurrence::Daily;
        g.duration = Some(15);
        let goals = vec![g];

        let occ = project(&goals, date(2024, 1, 2), CompletionFilter::default());
        assert_eq!(occ[0].time_of_day, None);
        assert_eq!(occ[0].duration_minutes, 15);
        assert_eq!(occ[0].tag, Some(OccurrenceTag::Recurring));
    }

    #[test]
    fn test_sub_goals_project_independently() {
        let mut g = goal_created("parent", 2024, 1, 1);
        let mut sub = SubGoal::new("step");
        sub.id = "s1".to_string();
        sub.scheduled_time = Some(at(2024, 1, 3, 8, 0));
        g.sub_goals.push(sub);
        let goals = vec![g];

        let occ = project(&goals, date(2024, 1, 3), CompletionFilter::default());
        assert_eq!(occ.len(), 1);
        assert_eq!(occ[0].kind, OccurrenceKind::Subgoal);
        assert_eq!(occ[0].duration_minutes, DEFAULT_SUB_GOAL_DURATION);
        assert_eq!(occ[0].source_goal_id, "parent");
        assert_eq!(occ[0].source_sub_goal_id, Some("s1"));
    }

    #[test]
    fn test_completion_filter_toggle() {
        let mut g = goal_created("done", 2024, 1, 1);
        g.scheduled_time = Some(at(2024, 1, 2, 10, 0));
        g.is_completed = true;
        let goals = vec![g];

        assert!(project(&goals, date(2024, 1, 2), CompletionFilter::ExcludeCompleted).is_empty());
        let all = project(&goals, date(2024, 1, 2), CompletionFilter::IncludeCompleted);
        assert_eq!(all.len(), 1);
        assert!(all[0].is_completed);
    }

    #[test]
    fn test_agenda_orders_and_skips_empty_days() {
        let mut daily = goal_created("daily", 2024, 1, 1);
        daily.recurrence = Recurrence::Daily;

        let mut timed = goal_created("timed", 2024, 1, 1);
        timed.scheduled_time = Some(at(2024, 1, 2, 7, 0));

        let mut late = goal_created("late", 2024, 1, 1);
        late.scheduled_time = Some(at(2024, 1, 2, 18, 0));

        let goals = vec![late, daily, timed];

        let days = agenda(&goals, date(2024, 1, 1), 3, AgendaOptions::default());
        assert_eq!(days.len(), 3);
        let ids: Vec<&str> = days[1].items.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["daily", "timed", "late"]);

        let days = agenda(&goals, date(2024, 1, 1), 3, AgendaOptions { hide_daily: true });
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, date(2024, 1, 2));
    }

    #[test]
    fn test_end_minute_caps_huge_duration() {
        let mut g = goal_created("long", 2024, 1, 1);
        g.scheduled_time = Some(at(2024, 1, 2, 10, 0));
        g.duration = Some(u32::MAX);
        let goals = vec![g];

        let occ = project(&goals, date(2024, 1, 2), CompletionFilter::default());
        assert_eq!(occ[0].end_minute(), Some(MINUTES_PER_DAY));
    }
}
