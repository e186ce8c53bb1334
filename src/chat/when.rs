//! Relative date phrases.
//!
//! Language models are good at reading intent but unreliable at calendar
//! arithmetic, so phrases like "tomorrow" or "next friday" are resolved
//! locally and attached to the forwarded message as concrete dates.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// A date phrase found in user text, resolved against today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateHint {
    /// The phrase as matched, lowercased and whitespace-normalized.
    pub phrase: String,
    /// The concrete date the phrase refers to.
    pub date: NaiveDate,
}

/// Scan `text` for relative date phrases and resolve each against `today`.
///
/// Matching is case-insensitive and each distinct phrase is reported once.
/// "next friday" lands in the following week, while "this friday" and bare
/// "friday" pick the nearest occurrence (today included).
pub fn date_hints(text: &str, today: NaiveDate) -> Vec<DateHint> {
    // Longest alternative first, so "day after tomorrow" is not consumed
    // as a bare "tomorrow".
    let pattern = regex::Regex::new(
        r"(?i)\b(day after tomorrow|tomorrow|today|yesterday|(?:next\s+|this\s+)?(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday))\b",
    )
    .expect("Invalid regex");

    let mut hints: Vec<DateHint> = Vec::new();
    for cap in pattern.captures_iter(text) {
        let phrase = cap[1]
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if hints.iter().any(|h| h.phrase == phrase) {
            continue;
        }
        if let Some(date) = resolve(&phrase, today) {
            hints.push(DateHint { phrase, date });
        }
    }
    hints
}

fn resolve(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    match phrase {
        "today" => Some(today),
        "tomorrow" => Some(today + Duration::days(1)),
        "day after tomorrow" => Some(today + Duration::days(2)),
        "yesterday" => Some(today - Duration::days(1)),
        _ => {
            let (skip_this_week, name) = if let Some(rest) = phrase.strip_prefix("next ") {
                (true, rest)
            } else if let Some(rest) = phrase.strip_prefix("this ") {
                (false, rest)
            } else {
                (false, phrase)
            };
            weekday_from_name(name).map(|target| next_weekday(today, target, skip_this_week))
        }
    }
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    let weekday_names = [
        ("monday", Weekday::Mon),
        ("tuesday", Weekday::Tue),
        ("wednesday", Weekday::Wed),
        ("thursday", Weekday::Thu),
        ("friday", Weekday::Fri),
        ("saturday", Weekday::Sat),
        ("sunday", Weekday::Sun),
    ];
    weekday_names
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, day)| *day)
}

/// Next occurrence of a weekday, counting today unless `skip_this_week`.
fn next_weekday(from: NaiveDate, target: Weekday, skip_this_week: bool) -> NaiveDate {
    let current_num = from.weekday().num_days_from_monday();
    let target_num = target.num_days_from_monday();

    let days_ahead = if target_num > current_num {
        (target_num - current_num) as i64
    } else if target_num < current_num {
        (7 - current_num + target_num) as i64
    } else if skip_this_week {
        7
    } else {
        0
    };

    let days_ahead = if skip_this_week && days_ahead < 7 {
        days_ahead + 7
    } else {
        days_ahead
    };

    from + Duration::days(days_ahead)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-06-11 is a Wednesday.
    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 11).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_tomorrow_resolves_to_next_day() {
        let hints = date_hints("am I free tomorrow?", wednesday());
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].phrase, "tomorrow");
        assert_eq!(hints[0].date, date(2025, 6, 12));
    }

    #[test]
    fn test_today_and_yesterday() {
        let hints = date_hints("compare today with yesterday", wednesday());
        assert_eq!(hints.len(), 2);
        assert_eq!(hints[0].date, date(2025, 6, 11));
        assert_eq!(hints[1].date, date(2025, 6, 10));
    }

    #[test]
    fn test_bare_weekday_picks_nearest_occurrence() {
        let hints = date_hints("lunch on Friday?", wednesday());
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].phrase, "friday");
        assert_eq!(hints[0].date, date(2025, 6, 13));
    }

    #[test]
    fn test_next_weekday_lands_in_following_week() {
        let hints = date_hints("book it for next wednesday", wednesday());
        assert_eq!(hints[0].date, date(2025, 6, 18));

        // The coming Monday is the 16th; "next monday" skips past it.
        let hints = date_hints("next monday works", wednesday());
        assert_eq!(hints[0].date, date(2025, 6, 23));
    }

    #[test]
    fn test_this_weekday_counts_today() {
        let hints = date_hints("what about this wednesday?", wednesday());
        assert_eq!(hints[0].date, date(2025, 6, 11));
    }

    #[test]
    fn test_day_after_tomorrow_is_a_single_hint() {
        let hints = date_hints("ship it the day after tomorrow", wednesday());
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].phrase, "day after tomorrow");
        assert_eq!(hints[0].date, date(2025, 6, 13));
    }

    #[test]
    fn test_repeated_phrases_collapse() {
        let hints = date_hints("tomorrow, and I mean Tomorrow", wednesday());
        assert_eq!(hints.len(), 1);
    }

    #[test]
    fn test_plain_text_yields_nothing() {
        assert!(date_hints("cancel my 3pm meeting", wednesday()).is_empty());
        assert!(date_hints("", wednesday()).is_empty());
    }
}
