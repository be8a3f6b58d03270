/// The classified purpose of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Reminder,
    List,
    Help,
    Fallback,
}

/// Keyword table, evaluated in order; first match wins. The ordering is
/// product behavior: a message containing both reminder and list phrasing
/// ("erinnere mich ... Liste ...") is a reminder.
const ROUTES: &[(&[&str], Intent)] = &[
    (&["erinnere", "erinnerung", "remind"], Intent::Reminder),
    (&["liste", "hinzufügen", "füge"], Intent::List),
    (&["hilfe", "help"], Intent::Help),
];

/// Pure routing over lower-cased trimmed text. No scoring, no ambiguity
/// resolution beyond the fixed priority order.
pub fn classify(text: &str) -> Intent {
    let normalized = text.trim().to_lowercase();
    for (keywords, intent) in ROUTES {
        if keywords.iter().any(|kw| normalized.contains(kw)) {
            return *intent;
        }
    }
    Intent::Fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reminder_phrasing_routes_to_reminder() {
        assert_eq!(
            classify("Erinnere mich in 5 Minuten an Test"),
            Intent::Reminder
        );
        assert_eq!(classify("  ERINNERUNG morgen  "), Intent::Reminder);
        assert_eq!(classify("remind me later"), Intent::Reminder);
    }

    #[test]
    fn list_phrasing_routes_to_list() {
        assert_eq!(
            classify("Füge Milch zur Einkaufsliste hinzu"),
            Intent::List
        );
        assert_eq!(classify("zeig mir die Liste"), Intent::List);
    }

    #[test]
    fn reminder_wins_over_list_when_both_match() {
        assert_eq!(
            classify("Erinnere mich an die Einkaufsliste"),
            Intent::Reminder
        );
    }

    #[test]
    fn help_and_fallback() {
        assert_eq!(classify("Hilfe"), Intent::Help);
        assert_eq!(classify("help"), Intent::Help);
        assert_eq!(classify("Guten Tag"), Intent::Fallback);
        assert_eq!(classify(""), Intent::Fallback);
    }
}
