//! Interval layout for a single day
//!
//! Packs timed occurrences into side-by-side columns so that no two items in
//! the same column overlap. Items are swept in start order and grouped into
//! clusters of transitively overlapping intervals; each cluster is packed
//! greedily into the lowest free column. The number of columns a cluster
//! opens equals its peak concurrency.
//!
//! Output is renderer-agnostic: a column index and the column count of the
//! item's cluster. Turning that into pixels is the caller's job.

use crate::model::MINUTES_PER_DAY;
use crate::schedule::Occurrence;
use serde::Serialize;

/// Visible minute range of the day view, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewWindow {
    pub start: u32,
    pub end: u32,
}

impl ViewWindow {
    pub const FULL_DAY: ViewWindow = ViewWindow {
        start: 0,
        end: MINUTES_PER_DAY,
    };

    pub fn from_hours(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start: start_hour.saturating_mul(60).min(MINUTES_PER_DAY),
            end: end_hour.saturating_mul(60).min(MINUTES_PER_DAY),
        }
    }

    /// Whether any part of `[start, end)` is inside the window
    pub fn shows(&self, start: u32, end: u32) -> bool {
        start.max(self.start) < end.min(self.end)
    }

    /// Portion of `[start, end)` inside the window
    pub fn clip(&self, start: u32, end: u32) -> (u32, u32) {
        (start.max(self.start), end.min(self.end))
    }
}

impl Default for ViewWindow {
    /// 06:00 to midnight
    fn default() -> Self {
        Self::from_hours(6, 24)
    }
}

/// An interval in minutes from midnight carrying an arbitrary payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimedOccurrence<T> {
    pub start: u32,
    pub end: u32,
    pub item: T,
}

impl<T> TimedOccurrence<T> {
    pub fn new(start: u32, end: u32, item: T) -> Self {
        Self { start, end, item }
    }

    pub fn duration(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

/// A laid-out interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedOccurrence<T> {
    pub start: u32,
    pub end: u32,
    pub column: usize,
    pub column_count: usize,
    pub item: T,
}

/// Occurrences that have a time of day, as intervals clipped to the day
pub fn timed_occurrences<'o, 'a>(
    occurrences: &'o [Occurrence<'a>],
) -> Vec<TimedOccurrence<&'o Occurrence<'a>>> {
    occurrences
        .iter()
        .filter_map(|o| {
            let start = o.time_of_day?.min(MINUTES_PER_DAY);
            let end = start
                .saturating_add(o.duration_minutes)
                .min(MINUTES_PER_DAY);
            Some(TimedOccurrence::new(start, end, o))
        })
        .collect()
}

/// Assign columns to every interval.
///
/// Items sort by start, longer first on ties. Items with nothing inside
/// `window` still take part in packing but are left out of the result.
pub fn layout<T>(occurrences: Vec<TimedOccurrence<T>>, window: ViewWindow) -> Vec<PositionedOccurrence<T>> {
    let mut sorted = occurrences;
    sorted.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.duration().cmp(&a.duration()))
    });

    let mut positioned = Vec::with_capacity(sorted.len());
    let mut cluster: Vec<(TimedOccurrence<T>, usize)> = Vec::new();
    // End of the last item placed in each column of the current cluster
    let mut column_ends: Vec<u32> = Vec::new();
    let mut cluster_end = 0;

    for occurrence in sorted {
        if !cluster.is_empty() && occurrence.start >= cluster_end {
            flush_cluster(&mut cluster, column_ends.len(), window, &mut positioned);
            column_ends.clear();
        }

        cluster_end = if cluster.is_empty() {
            occurrence.end
        } else {
            cluster_end.max(occurrence.end)
        };

        let column = match column_ends.iter().position(|&end| end <= occurrence.start) {
            Some(free) => {
                column_ends[free] = occurrence.end;
                free
            }
            None => {
                column_ends.push(occurrence.end);
                column_ends.len() - 1
            }
        };
        cluster.push((occurrence, column));
    }
    flush_cluster(&mut cluster, column_ends.len(), window, &mut positioned);

    tracing::trace!(placed = positioned.len(), "laid out day view");
    positioned
}

fn flush_cluster<T>(
    cluster: &mut Vec<(TimedOccurrence<T>, usize)>,
    column_count: usize,
    window: ViewWindow,
    out: &mut Vec<PositionedOccurrence<T>>,
) {
    for (occurrence, column) in cluster.drain(..) {
        if !window.shows(occurrence.start, occurrence.end) {
            continue;
        }
        out.push(PositionedOccurrence {
            start: occurrence.start,
            end: occurrence.end,
            column,
            column_count,
            item: occurrence.item,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::OccurrenceKind;

    fn spans(ranges: &[(u32, u32)]) -> Vec<TimedOccurrence<usize>> {
        ranges
            .iter()
            .enumerate()
            .map(|(i, &(s, e))| TimedOccurrence::new(s, e, i))
            .collect()
    }

    fn columns(placed: &[PositionedOccurrence<usize>]) -> Vec<(usize, usize, usize)> {
        let mut cols: Vec<_> = placed
            .iter()
            .map(|p| (p.item, p.column, p.column_count))
            .collect();
        cols.sort();
        cols
    }

    #[test]
    fn test_touching_item_reuses_column() {
        let placed = layout(spans(&[(540, 600), (550, 620), (600, 630)]), ViewWindow::FULL_DAY);
        assert_eq!(columns(&placed), vec![(0, 0, 2), (1, 1, 2), (2, 0, 2)]);
    }

    #[test]
    fn test_separate_clusters_have_own_width() {
        let placed = layout(
            spans(&[(480, 540), (500, 520), (600, 660)]),
            ViewWindow::FULL_DAY,
        );
        assert_eq!(columns(&placed), vec![(0, 0, 2), (1, 1, 2), (2, 0, 1)]);
    }

    #[test]
    fn test_longer_item_claims_first_column_on_tie() {
        let placed = layout(spans(&[(600, 630), (600, 720)]), ViewWindow::FULL_DAY);
        assert_eq!(columns(&placed), vec![(0, 1, 2), (1, 0, 2)]);
    }

    #[test]
    fn test_chain_overlap_counts_peak_only() {
        // a overlaps b, b overlaps c, a and c never overlap: one cluster, two columns
        let placed = layout(
            spans(&[(0, 100), (50, 150), (120, 200)]),
            ViewWindow::FULL_DAY,
        );
        assert!(placed.iter().all(|p| p.column_count == 2));
        assert_eq!(columns(&placed), vec![(0, 0, 2), (1, 1, 2), (2, 0, 2)]);
    }

    #[test]
    fn test_items_outside_window_are_omitted() {
        let window = ViewWindow::from_hours(6, 24);
        let placed = layout(spans(&[(60, 120), (330, 420), (600, 660)]), window);

        let kept: Vec<usize> = placed.iter().map(|p| p.item).collect();
        assert_eq!(kept, vec![1, 2]);
        assert_eq!(window.clip(330, 420), (360, 420));
    }

    #[test]
    fn test_timed_occurrences_skip_anytime_items() {
        let occurrences = vec![
            Occurrence {
                id: "a",
                kind: OccurrenceKind::Goal,
                content: "timed",
                time_of_day: Some(23 * 60 + 30),
                duration_minutes: 60,
                is_completed: false,
                source_goal_id: "a",
                source_sub_goal_id: None,
                tag: None,
            },
            Occurrence {
                id: "b",
                kind: OccurrenceKind::Goal,
                content: "anytime",
                time_of_day: None,
                duration_minutes: 60,
                is_completed: false,
                source_goal_id: "b",
                source_sub_goal_id: None,
                tag: None,
            },
        ];

        let timed = timed_occurrences(&occurrences);
        assert_eq!(timed.len(), 1);
        assert_eq!(timed[0].start, 23 * 60 + 30);
        assert_eq!(timed[0].end, MINUTES_PER_DAY);
        assert_eq!(timed[0].item.id, "a");
    }

    #[test]
    fn test_window_from_absurd_hours_is_capped() {
        assert_eq!(ViewWindow::from_hours(u32::MAX, u32::MAX), ViewWindow {
            start: MINUTES_PER_DAY,
            end: MINUTES_PER_DAY,
        });
        assert_eq!(ViewWindow::from_hours(8, 100).end, MINUTES_PER_DAY);
    }
}
