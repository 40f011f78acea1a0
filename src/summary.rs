//! Streak and summary statistics.
//!
//! Pure over the entry log: unordered, possibly duplicated input is fine.
//! Duplicate (habit, date) records are collapsed before any math (latest
//! timestamp wins) so a data-integrity violation upstream never inflates
//! counts here.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, NaiveDate};

use crate::clock::parse_date_key;
use crate::model::HabitEntry;

#[derive(Debug, Clone, PartialEq)]
pub struct HabitSummary {
    pub habit_id: String,
    pub total_entries: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub weekly_entries: usize,
    pub monthly_entries: usize,
    pub yearly_entries: usize,
    pub level_distribution: HashMap<String, usize>,
}

/// Summarize one habit's slice of the entry log as of `today`.
pub fn summarize(habit_id: &str, entries: &[HabitEntry], today: NaiveDate) -> HabitSummary {
    // One entry per date, latest write wins.
    let mut by_date: BTreeMap<NaiveDate, &HabitEntry> = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.habit_id == habit_id) {
        let Some(date) = parse_date_key(&entry.date) else {
            log::warn!("[SUMMARY] skipping entry {} with malformed date {:?}", entry.id, entry.date);
            continue;
        };
        match by_date.get(&date) {
            Some(prev) if prev.timestamp >= entry.timestamp => {}
            _ => {
                by_date.insert(date, entry);
            }
        }
    }

    let mut level_distribution: HashMap<String, usize> = HashMap::new();
    for entry in by_date.values() {
        *level_distribution.entry(entry.level_id.clone()).or_default() += 1;
    }

    // Local-calendar period boundaries; week starts Sunday.
    let week_start = today - Days::new(u64::from(today.weekday().num_days_from_sunday()));
    let month_start = today.with_day(1).unwrap_or(today);
    let year_start = today.with_ordinal(1).unwrap_or(today);
    let in_period = |start: NaiveDate| by_date.keys().filter(|d| **d >= start && **d <= today).count();

    HabitSummary {
        habit_id: habit_id.to_string(),
        total_entries: by_date.len(),
        current_streak: current_streak(&by_date, today),
        longest_streak: longest_streak(&by_date),
        weekly_entries: in_period(week_start),
        monthly_entries: in_period(month_start),
        yearly_entries: in_period(year_start),
        level_distribution,
    }
}

/// Consecutive completed days ending today. No entry today means the streak
/// is 0; a miss on any earlier day ends the walk, so a completion after a gap
/// starts a fresh streak of 1.
fn current_streak(by_date: &BTreeMap<NaiveDate, &HabitEntry>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    while by_date.contains_key(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Longest consecutive-day run anywhere in the log, including the final run.
fn longest_streak(by_date: &BTreeMap<NaiveDate, &HabitEntry>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for date in by_date.keys() {
        run = match prev {
            Some(p) if (*date - p).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(*date);
    }
    longest
}
