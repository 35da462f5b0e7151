//! Field validators.
//!
//! Each rule is checked by [`check`], a pure function from a field value to
//! an optional [`ValidationError`]. Length, count and pattern rules only look
//! at present values; presence is the job of [`Rule::Required`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// A field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub field_id: String,
    pub error_message: String,
}

impl ValidationError {
    pub fn new(field_id: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            error_message: error_message.into(),
        }
    }
}

/// Read-only view of a field, as seen by the validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Text input; `None` when absent.
    Text(Option<&'a str>),
    /// List length or number of selected options.
    Count(usize),
}

/// Shape checks for contact handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Email,
    Telegram,
}

impl PatternKind {
    pub fn matches(self, value: &str) -> bool {
        match self {
            PatternKind::Email => EMAIL.is_match(value),
            PatternKind::Telegram => TELEGRAM.is_match(value),
        }
    }

    fn message(self) -> &'static str {
        match self {
            PatternKind::Email => "Invalid email address",
            PatternKind::Telegram => "Telegram handle must start with @ followed by letters, digits or underscores",
        }
    }
}

// Local part: dot-separated atoms, so no leading, trailing or doubled dots.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

static TELEGRAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@\w+$").expect("telegram pattern compiles"));


/// A single validation rule and its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Rule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    MinItems(usize),
    MaxItems(usize),
    Pattern(PatternKind),
}

/// Check one value against one rule.
pub fn check(field_id: &str, value: FieldValue<'_>, rule: Rule) -> Option<ValidationError> {
    let message = match (rule, value) {
        (Rule::Required, FieldValue::Text(text)) => {
            if text.map_or(true, |s| s.trim().is_empty()) {
                "This field is required".to_string()
            } else {
                return None;
            }
        }
        (Rule::Required, FieldValue::Count(0)) => "Select at least one option".to_string(),

        (Rule::MinLength(min), FieldValue::Text(Some(s))) if !s.trim().is_empty() && s.chars().count() < min => {
            format!("Minimum {min} characters")
        }
        (Rule::MaxLength(max), FieldValue::Text(Some(s))) if s.chars().count() > max => {
            format!("Maximum {max} characters")
        }

        (Rule::MinItems(min), FieldValue::Count(n)) if n > 0 && n < min => format!("Select at least {min}"),
        (Rule::MaxItems(max), FieldValue::Count(n)) if n > max => format!("Maximum {max} items"),

        (Rule::Pattern(kind), FieldValue::Text(Some(s))) if !s.trim().is_empty() && !kind.matches(s) => {
            kind.message().to_string()
        }

        _ => return None,
    };
    Some(ValidationError::new(field_id, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn text(s: &str) -> FieldValue<'_> {
        FieldValue::Text(Some(s))
    }

    #[test]
    fn required_text() {
        assert!(check("f", FieldValue::Text(None), Rule::Required).is_some());
        assert!(check("f", text(""), Rule::Required).is_some());
        assert!(check("f", text("   "), Rule::Required).is_some());
        assert!(check("f", text("x"), Rule::Required).is_none());
    }

    #[test]
    fn required_count() {
        assert!(check("f", FieldValue::Count(0), Rule::Required).is_some());
        assert!(check("f", FieldValue::Count(1), Rule::Required).is_none());
    }

    #[test]
    fn length_bounds_count_characters() {
        let err = check("superpower", text("short"), Rule::MinLength(10)).unwrap();
        assert_eq!(err.field_id, "superpower");
        assert_eq!(err.error_message, "Minimum 10 characters");

        // Ten Cyrillic letters are twenty bytes but ten characters.
        assert!(check("superpower", text("нейросетьи"), Rule::MinLength(10)).is_none());
        assert!(check("superpower", text("нейросетьи"), Rule::MaxLength(10)).is_none());

        let long = "a".repeat(201);
        let err = check("superpower", text(&long), Rule::MaxLength(200)).unwrap();
        assert_eq!(err.error_message, "Maximum 200 characters");
    }

    #[test]
    fn length_rules_skip_absent_values() {
        assert!(check("f", FieldValue::Text(None), Rule::MinLength(10)).is_none());
        assert!(check("f", text(""), Rule::MinLength(10)).is_none());
        assert!(check("f", text("   "), Rule::MinLength(10)).is_none());
    }

    #[test]
    fn blank_text_reports_required_only() {
        let rules = [Rule::Required, Rule::MinLength(10), Rule::MaxLength(200)];
        let errors: Vec<_> = rules
            .iter()
            .filter_map(|rule| check("superpower", text("   "), *rule))
            .collect();
        assert_eq!(errors, vec![ValidationError::new("superpower", "This field is required")]);
    }

    #[test]
    fn item_bounds() {
        assert!(check("portfolio", FieldValue::Count(10), Rule::MaxItems(10)).is_none());
        let err = check("portfolio", FieldValue::Count(11), Rule::MaxItems(10)).unwrap();
        assert_eq!(err.error_message, "Maximum 10 items");
        assert!(check("abilities", FieldValue::Count(1), Rule::MinItems(2)).is_some());
        // An empty selection is reported by Required alone.
        assert!(check("abilities", FieldValue::Count(0), Rule::MinItems(1)).is_none());
    }

    #[test]
    fn email_accepts() {
        for email in ["test@example.com", "user.name@domain.co.uk", "a+tag@sub.example.org"] {
            assert!(PatternKind::Email.matches(email), "{email} should be valid");
        }
    }

    #[test]
    fn email_rejects() {
        for email in [
            "invalid-email",
            "test@",
            "@domain.com",
            "test..test@domain.com",
            ".test@domain.com",
            "test.@domain.com",
            "test@domain",
            "test@@domain.com",
        ] {
            assert!(!PatternKind::Email.matches(email), "{email} should be invalid");
        }
    }

    #[test]
    fn telegram_handles() {
        assert!(PatternKind::Telegram.matches("@neural_dev"));
        assert!(PatternKind::Telegram.matches("@a1"));
        assert!(!PatternKind::Telegram.matches("neural_dev"));
        assert!(!PatternKind::Telegram.matches("@"));
        assert!(!PatternKind::Telegram.matches("@bad-handle"));
    }

    #[test]
    fn pattern_rules_skip_absent_values() {
        let rule = Rule::Pattern(PatternKind::Email);
        assert!(check("email", FieldValue::Text(None), rule).is_none());
        let err = check("email", text("nope"), rule).unwrap();
        assert_eq!(err.error_message, "Invalid email address");
    }

    #[test]
    fn error_serializes_camel_case() {
        let err = ValidationError::new("telegram", "bad");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({ "fieldId": "telegram", "errorMessage": "bad" }));
    }

    proptest! {
        #[test]
        fn telegram_word_handles_pass(handle in "[A-Za-z0-9_]{1,32}") {
            let with_at = format!("@{handle}");
            prop_assert!(check("telegram", text(&with_at), Rule::Pattern(PatternKind::Telegram)).is_none());
            prop_assert!(check("telegram", text(&handle), Rule::Pattern(PatternKind::Telegram)).is_some());
        }

        #[test]
        fn simple_emails_pass(
            local in "[a-z0-9]{1,10}(\\.[a-z0-9]{1,10}){0,2}",
            domain in "[a-z0-9]{1,10}",
            tld in "[a-z]{2,6}",
        ) {
            let email = format!("{local}@{domain}.{tld}");
            prop_assert!(PatternKind::Email.matches(&email), "{} should be valid", email);
        }

        #[test]
        fn doubled_dots_fail(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
            let email = format!("{a}..{b}@domain.com");
            prop_assert!(!PatternKind::Email.matches(&email));
        }
    }
}
