use super::{BERLIN, TimeExtractor, TimeMatch};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use regex::Regex;
use std::sync::LazyLock;

// Relative offsets: "in 5 Minuten", "in zwei Stunden", "in einem Tag".
static RELATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bin\s+(\d+|einer|einem|eine|ein|zwei|drei|vier|fünf|sechs|sieben|acht|neun|zehn)\s+(minuten|minute|min|stunden|stunde|std|tagen|tage|tag|wochen|woche)\b",
    )
    .expect("RELATIVE pattern must compile")
});

// Day words with an optional clock time: "morgen", "übermorgen um 8 Uhr".
static DAY_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(heute|übermorgen|morgen)(?:\s+um\s+(\d{1,2})(?::(\d{2}))?(?:\s+uhr)?)?\b")
        .expect("DAY_WORD pattern must compile")
});

// Weekdays: "am Montag", "am Freitag um 18:00".
static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bam\s+(montag|dienstag|mittwoch|donnerstag|freitag|samstag|sonntag)(?:\s+um\s+(\d{1,2})(?::(\d{2}))?(?:\s+uhr)?)?\b",
    )
    .expect("WEEKDAY pattern must compile")
});

// Bare clock time: "um 15:00", "um 9 Uhr".
static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bum\s+(\d{1,2})(?::(\d{2}))?(?:\s+uhr)?\b")
        .expect("CLOCK pattern must compile")
});

/// Wall-clock hour used when a message names a day but no time.
const DEFAULT_HOUR: u32 = 9;

/// Regex-backed extractor for the German time expressions the assistant
/// understands. All wall-clock expressions resolve in Europe/Berlin and come
/// back as UTC instants.
#[derive(Debug, Default, Clone, Copy)]
pub struct GermanTimeParser;

impl GermanTimeParser {
    pub fn new() -> Self {
        Self
    }

    fn collect(&self, text: &str, reference: DateTime<Utc>) -> Vec<TimeMatch> {
        let local_ref = reference.with_timezone(&BERLIN);
        let today = local_ref.date_naive();
        let mut found = Vec::new();

        for caps in RELATIVE.captures_iter(text) {
            let m = caps.get(0).expect("full match");
            let Some(amount) = parse_amount(&caps[1]) else {
                continue;
            };
            let Some(offset) = parse_unit(&caps[2], amount) else {
                continue;
            };
            found.push(TimeMatch {
                start: m.start(),
                end: m.end(),
                matched: m.as_str().to_string(),
                resolved: reference + offset,
            });
        }

        for caps in DAY_WORD.captures_iter(text) {
            let m = caps.get(0).expect("full match");
            let days = match caps[1].to_lowercase().as_str() {
                "heute" => 0,
                "morgen" => 1,
                _ => 2,
            };
            let time = clock_from_captures(caps.get(2), caps.get(3));
            let Some(resolved) = to_utc(today + Duration::days(days), time) else {
                continue;
            };
            found.push(TimeMatch {
                start: m.start(),
                end: m.end(),
                matched: m.as_str().to_string(),
                resolved,
            });
        }

        for caps in WEEKDAY.captures_iter(text) {
            let m = caps.get(0).expect("full match");
            let Some(target) = parse_weekday(&caps[1]) else {
                continue;
            };
            let time = clock_from_captures(caps.get(2), caps.get(3));
            let mut days_ahead =
                (target.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
            // "am Montag" said on a Monday means the next one, unless the
            // named time is still ahead today.
            if days_ahead == 0 {
                let still_ahead = to_utc(today, time).is_some_and(|utc| utc > reference);
                if !still_ahead {
                    days_ahead = 7;
                }
            }
            let Some(resolved) = to_utc(today + Duration::days(i64::from(days_ahead)), time) else {
                continue;
            };
            found.push(TimeMatch {
                start: m.start(),
                end: m.end(),
                matched: m.as_str().to_string(),
                resolved,
            });
        }

        for caps in CLOCK.captures_iter(text) {
            let m = caps.get(0).expect("full match");
            let time = clock_from_captures(caps.get(1), caps.get(2));
            let Some(mut resolved) = to_utc(today, time) else {
                continue;
            };
            // A bare time that already passed today means tomorrow.
            if resolved <= reference {
                let Some(next) = to_utc(today + Duration::days(1), time) else {
                    continue;
                };
                resolved = next;
            }
            found.push(TimeMatch {
                start: m.start(),
                end: m.end(),
                matched: m.as_str().to_string(),
                resolved,
            });
        }

        found
    }
}

impl TimeExtractor for GermanTimeParser {
    fn extract(&self, text: &str, reference: DateTime<Utc>) -> Vec<TimeMatch> {
        let mut candidates = self.collect(text, reference);
        // Input order; on overlap the earlier (and on ties the longer) span
        // wins, so "morgen um 8" shadows the inner "um 8".
        candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        let mut out: Vec<TimeMatch> = Vec::new();
        for candidate in candidates {
            if out.last().is_none_or(|prev| candidate.start >= prev.end) {
                out.push(candidate);
            }
        }
        out
    }
}

fn parse_amount(s: &str) -> Option<i64> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    let n = match s.to_lowercase().as_str() {
        "ein" | "eine" | "einer" | "einem" => 1,
        "zwei" => 2,
        "drei" => 3,
        "vier" => 4,
        "fünf" => 5,
        "sechs" => 6,
        "sieben" => 7,
        "acht" => 8,
        "neun" => 9,
        "zehn" => 10,
        _ => return None,
    };
    Some(n)
}

fn parse_unit(s: &str, amount: i64) -> Option<Duration> {
    let unit = s.to_lowercase();
    if unit.starts_with("min") {
        Some(Duration::minutes(amount))
    } else if unit.starts_with("st") {
        Some(Duration::hours(amount))
    } else if unit.starts_with("tag") {
        Some(Duration::days(amount))
    } else if unit.starts_with("woch") {
        Some(Duration::weeks(amount))
    } else {
        None
    }
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    let day = match s.to_lowercase().as_str() {
        "montag" => Weekday::Mon,
        "dienstag" => Weekday::Tue,
        "mittwoch" => Weekday::Wed,
        "donnerstag" => Weekday::Thu,
        "freitag" => Weekday::Fri,
        "samstag" => Weekday::Sat,
        "sonntag" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn clock_from_captures(hour: Option<regex::Match<'_>>, minute: Option<regex::Match<'_>>) -> NaiveTime {
    let h: u32 = hour
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(DEFAULT_HOUR);
    let m: u32 = minute.and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    NaiveTime::from_hms_opt(h.min(23), m.min(59), 0).expect("clamped clock time is valid")
}

fn to_utc(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    // earliest() picks the first wall clock on DST fold days; the spring
    // forward gap yields None and the candidate is skipped.
    BERLIN
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // Monday 2025-03-10, 12:00 UTC = 13:00 Berlin (CET).
    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn extract(text: &str) -> Vec<TimeMatch> {
        GermanTimeParser::new().extract(text, reference())
    }

    #[test]
    fn relative_minutes() {
        let matches = extract("Erinnere mich in 5 Minuten an Müll rausbringen");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched, "in 5 Minuten");
        assert_eq!(matches[0].resolved, reference() + Duration::minutes(5));
    }

    #[test]
    fn relative_word_numbers() {
        let matches = extract("in zwei Stunden Pizza bestellen");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].resolved, reference() + Duration::hours(2));
    }

    #[test]
    fn tomorrow_with_clock_time() {
        let matches = extract("Erinnere mich morgen um 8 an den Termin");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched, "morgen um 8");
        // 08:00 Berlin on 2025-03-11 is 07:00 UTC in winter
        assert_eq!(
            matches[0].resolved,
            Utc.with_ymd_and_hms(2025, 3, 11, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn bare_clock_time_later_today() {
        let matches = extract("um 15:00 bitte melden");
        assert_eq!(matches.len(), 1);
        assert_eq!(
            matches[0].resolved,
            Utc.with_ymd_and_hms(2025, 3, 10, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn bare_clock_time_already_past_rolls_to_tomorrow() {
        // 09:00 Berlin is behind the 13:00 local reference
        let matches = extract("um 9 Uhr Kaffee");
        assert_eq!(matches.len(), 1);
        assert_eq!(
            matches[0].resolved,
            Utc.with_ymd_and_hms(2025, 3, 11, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn weekday_resolves_to_next_occurrence() {
        let matches = extract("am Freitag um 18:00 Sport");
        assert_eq!(matches.len(), 1);
        assert_eq!(
            matches[0].resolved,
            Utc.with_ymd_and_hms(2025, 3, 14, 17, 0, 0).unwrap()
        );
    }

    #[test]
    fn same_weekday_without_time_means_next_week() {
        let matches = extract("am Montag Wäsche");
        assert_eq!(matches.len(), 1);
        // default 09:00 already passed on the reference Monday
        assert_eq!(
            matches[0].resolved,
            Utc.with_ymd_and_hms(2025, 3, 17, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn overlapping_spans_keep_the_outer_match() {
        let matches = extract("morgen um 8 Zähne putzen");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched, "morgen um 8");
    }

    #[test]
    fn text_without_time_yields_nothing() {
        assert!(extract("kauf bitte Milch").is_empty());
    }
}
