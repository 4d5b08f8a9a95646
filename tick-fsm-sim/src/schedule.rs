//! Button press schedules such as `open@500,stop@3000`.

use std::str::FromStr;

use crate::error::SimError;

/// How long a scheduled press holds the button down.
pub const DEFAULT_HOLD_MS: u64 = 150;

/// One button press at an absolute simulated time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Press {
    pub button: String,
    pub at_ms: u64,
    pub hold_ms: u64,
}

impl Press {
    /// A press with the default hold. Button names are matched in lowercase.
    #[must_use]
    pub fn new(button: impl Into<String>, at_ms: u64) -> Self {
        let mut button = button.into();
        button.make_ascii_lowercase();
        Self {
            button,
            at_ms,
            hold_ms: DEFAULT_HOLD_MS,
        }
    }

    /// Whether the button is held down at `now_ms`.
    #[must_use]
    pub fn is_held(&self, now_ms: u64) -> bool {
        now_ms >= self.at_ms && now_ms < self.at_ms.saturating_add(self.hold_ms)
    }
}

impl FromStr for Press {
    type Err = SimError;

    /// Parses `<button>@<millis>` or `<button>@<millis>+<hold>`.
    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let (button, when) = entry
            .trim()
            .split_once('@')
            .filter(|(button, _)| !button.is_empty())
            .ok_or_else(|| SimError::MalformedPress(entry.to_string()))?;

        let parse = |text: &str| {
            text.trim()
                .parse::<u64>()
                .map_err(|err| SimError::InvalidTime {
                    entry: entry.to_string(),
                    reason: err.to_string(),
                })
        };

        let (at_ms, hold_ms) = match when.split_once('+') {
            Some((at, hold)) => (parse(at)?, parse(hold)?),
            None => (parse(when)?, DEFAULT_HOLD_MS),
        };

        Ok(Self {
            button: button.trim().to_ascii_lowercase(),
            at_ms,
            hold_ms,
        })
    }
}

/// Parses a comma-separated press list, ignoring empty entries.
///
/// # Errors
/// Returns the first entry that fails to parse.
pub fn parse_presses(list: &str) -> Result<Vec<Press>, SimError> {
    list.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_press_list() {
        let presses = parse_presses("open@500, Stop@3000+400,").unwrap();
        assert_eq!(
            presses,
            [
                Press::new("open", 500),
                Press {
                    button: "stop".into(),
                    at_ms: 3_000,
                    hold_ms: 400
                }
            ]
        );
    }

    #[test]
    fn rejects_missing_separator_and_bad_numbers() {
        assert_eq!(
            "open".parse::<Press>(),
            Err(SimError::MalformedPress("open".into()))
        );
        assert_eq!(
            "@10".parse::<Press>(),
            Err(SimError::MalformedPress("@10".into()))
        );
        assert!(matches!(
            "open@soon".parse::<Press>(),
            Err(SimError::InvalidTime { .. })
        ));
    }

    #[test]
    fn constructed_and_parsed_names_agree() {
        assert_eq!(Press::new("Open", 500), "OPEN@500".parse().unwrap());
        assert_eq!(Press::new("Open", 500).button, "open");
    }

    #[test]
    fn hold_window_is_half_open() {
        let press = Press::new("reset", 1_000);
        assert!(!press.is_held(999));
        assert!(press.is_held(1_000));
        assert!(press.is_held(1_149));
        assert!(!press.is_held(1_150));
    }
}
