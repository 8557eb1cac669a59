//! Frame duration validation.
//!
//! Duration edits never fail. Numbers below the minimum are raised to it,
//! and text that does not start with an integer is replaced by the
//! fallback duration.

use flipbook_common::config::EditorDefaults;

/// A duration edit as it arrives from an input control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationInput {
    /// An already numeric value, possibly out of range.
    Millis(i64),
    /// Raw text typed by the user.
    Text(String),
}

impl From<i64> for DurationInput {
    fn from(value: i64) -> Self {
        Self::Millis(value)
    }
}

impl From<i32> for DurationInput {
    fn from(value: i32) -> Self {
        Self::Millis(value as i64)
    }
}

impl From<u32> for DurationInput {
    fn from(value: u32) -> Self {
        Self::Millis(value as i64)
    }
}

impl From<&str> for DurationInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DurationInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Clamp rules for frame durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationPolicy {
    minimum_ms: u32,
    fallback_ms: u32,
}

impl DurationPolicy {
    /// Create a policy. The minimum is at least 1 ms and the fallback is
    /// never below the minimum.
    pub fn new(minimum_ms: u32, fallback_ms: u32) -> Self {
        let minimum_ms = minimum_ms.max(1);
        Self {
            minimum_ms,
            fallback_ms: fallback_ms.max(minimum_ms),
        }
    }

    pub fn from_defaults(defaults: &EditorDefaults) -> Self {
        Self::new(defaults.minimum_duration_ms, defaults.fallback_duration_ms)
    }

    pub fn minimum_ms(&self) -> u32 {
        self.minimum_ms
    }

    pub fn fallback_ms(&self) -> u32 {
        self.fallback_ms
    }

    /// Clamp a numeric value into `[minimum, u32::MAX]`.
    pub fn clamp(&self, value: i64) -> u32 {
        value.clamp(self.minimum_ms as i64, u32::MAX as i64) as u32
    }

    /// Turn any input into a valid duration.
    pub fn resolve(&self, input: &DurationInput) -> u32 {
        match input {
            DurationInput::Millis(value) => self.clamp(*value),
            DurationInput::Text(text) => match parse_leading_integer(text) {
                Some(value) => self.clamp(value),
                None => self.fallback_ms,
            },
        }
    }
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self::from_defaults(&EditorDefaults::default())
    }
}

/// Parse the integer at the start of `text`, ignoring leading whitespace
/// and anything after the digits (`" 42ms"` is 42, `"12.9"` is 12).
pub fn parse_leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        seen_digit = true;
        value = value
            .saturating_mul(10)
            .saturating_add((byte - b'0') as i64);
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_against_minimum_one() {
        let policy = DurationPolicy::new(1, 100);
        let inputs = [
            DurationInput::Millis(-5),
            DurationInput::Millis(0),
            DurationInput::from("abc"),
            DurationInput::Millis(37),
        ];
        let resolved: Vec<u32> = inputs.iter().map(|i| policy.resolve(i)).collect();
        assert_eq!(resolved, vec![1, 1, 100, 37]);
    }

    #[test]
    fn test_text_parsing_takes_leading_digits() {
        let policy = DurationPolicy::new(10, 100);
        assert_eq!(policy.resolve(&" 42ms".into()), 42);
        assert_eq!(policy.resolve(&"12.9".into()), 12);
        assert_eq!(policy.resolve(&"3".into()), 10);
        assert_eq!(policy.resolve(&"-20".into()), 10);
        assert_eq!(policy.resolve(&"".into()), 100);
        assert_eq!(policy.resolve(&"ms42".into()), 100);
    }

    #[test]
    fn test_policy_normalizes_its_bounds() {
        let policy = DurationPolicy::new(0, 0);
        assert_eq!(policy.minimum_ms(), 1);
        assert_eq!(policy.fallback_ms(), 1);

        let policy = DurationPolicy::new(50, 20);
        assert_eq!(policy.fallback_ms(), 50);
    }

    #[test]
    fn test_huge_values_saturate() {
        let policy = DurationPolicy::default();
        assert_eq!(policy.resolve(&"99999999999999999999999".into()), u32::MAX);
        assert_eq!(policy.clamp(i64::MAX), u32::MAX);
    }
}
