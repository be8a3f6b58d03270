//! Natural-language time handling.
//!
//! Date/time extraction is an external collaborator behind `TimeExtractor`:
//! raw text in, zero-or-more (matched span, resolved instant) pairs out, in
//! input order. The bundled implementation covers the German expressions the
//! assistant understands; tests substitute fakes.

pub mod datetime;

pub use datetime::GermanTimeParser;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// The single supported display/resolution zone.
pub const BERLIN: Tz = chrono_tz::Europe::Berlin;

/// One recognized time expression inside a message.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeMatch {
    /// Byte offset of the matched span in the original text.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
    /// The matched substring, verbatim.
    pub matched: String,
    /// The resolved absolute instant.
    pub resolved: DateTime<Utc>,
}

pub trait TimeExtractor: Send + Sync {
    /// Scan `text` for time expressions relative to `reference`.
    /// Matches are returned in input order and never overlap.
    fn extract(&self, text: &str, reference: DateTime<Utc>) -> Vec<TimeMatch>;
}

/// Render an instant for user-facing confirmations: German day-first date in
/// the fixed Europe/Berlin zone.
pub fn format_berlin(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&BERLIN)
        .format("%d.%m.%Y um %H:%M Uhr")
        .to_string()
}
