//! Local-calendar date keys and day-rollover detection.
//!
//! Date keys are always computed from the *local* calendar fields of an
//! instant. Truncating a UTC ISO timestamp instead files entries under the
//! wrong day near midnight in any timezone offset from UTC, which is exactly
//! the bug this module exists to prevent.

use chrono::{DateTime, Datelike, Local, NaiveDate};

/// `YYYY-MM-DD` key for the local calendar day containing `when`.
pub fn local_date_key(when: DateTime<Local>) -> String {
    format!("{:04}-{:02}-{:02}", when.year(), when.month(), when.day())
}

/// Key for the current local calendar day. Two calls within the same local
/// day always return the same string.
pub fn today_key() -> String {
    local_date_key(Local::now())
}

/// Today as a plain calendar date (for streak math).
pub fn today_date() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Notifies subscribers when the local calendar day changes.
///
/// Hosts call [`DayWatcher::tick`] from whatever cadence they already have (a
/// timer, an app-foreground hook); listeners fire exactly once per day change
/// no matter how often tick is called.
pub struct DayWatcher {
    last_key: String,
    listeners: Vec<Box<dyn FnMut(&str)>>,
}

impl DayWatcher {
    pub fn new() -> Self {
        Self {
            last_key: today_key(),
            listeners: Vec::new(),
        }
    }

    pub fn subscribe<F: FnMut(&str) + 'static>(&mut self, listener: F) {
        self.listeners.push(Box::new(listener));
    }

    /// Check the wall clock; returns true if the day rolled over.
    pub fn tick(&mut self) -> bool {
        self.roll_to(&today_key())
    }

    fn roll_to(&mut self, key: &str) -> bool {
        if key == self.last_key {
            return false;
        }
        log::info!("[CLOCK] day rolled over {} -> {}", self.last_key, key);
        self.last_key = key.to_string();
        for listener in &mut self.listeners {
            listener(key);
        }
        true
    }
}

impl Default for DayWatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn key_uses_local_calendar_fields() {
        let when = Local.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        // Whatever UTC date this instant falls on, the key is the local day.
        assert_eq!(local_date_key(when), "2023-12-31");
    }

    #[test]
    fn key_pads_single_digit_fields() {
        let when = Local.with_ymd_and_hms(2023, 1, 5, 12, 0, 0).unwrap();
        assert_eq!(local_date_key(when), "2023-01-05");
    }

    #[test]
    fn midnight_boundary_rolls_to_the_next_key() {
        let before = Local.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let after = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();
        assert_eq!(local_date_key(before), "2023-12-31");
        assert_eq!(local_date_key(after), "2024-01-01");
    }

    #[test]
    fn today_key_matches_local_date_key_of_now() {
        assert_eq!(today_key(), local_date_key(Local::now()));
    }

    #[test]
    fn parse_round_trips() {
        let date = parse_date_key("2024-02-29").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(parse_date_key("not-a-date").is_none());
    }

    #[test]
    fn watcher_fires_once_per_day_change() {
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let mut watcher = DayWatcher::new();
        let sink = seen.clone();
        watcher.subscribe(move |key| sink.borrow_mut().push(key.to_string()));

        let last = watcher.last_key.clone();
        assert!(!watcher.roll_to(&last));
        assert!(watcher.roll_to("2099-01-01"));
        assert!(!watcher.roll_to("2099-01-01"));
        assert!(watcher.roll_to("2099-01-02"));

        assert_eq!(*seen.borrow(), vec!["2099-01-01".to_string(), "2099-01-02".to_string()]);
    }
}
