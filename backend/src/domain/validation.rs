//! Shape checks shared by the record inputs.
//!
//! Every input collects all of its field violations before anything touches
//! storage or the network, so a malformed request is rejected in one round
//! trip and never triggers a remote call.

use std::sync::LazyLock;

use regex::Regex;

use super::{Error, FieldViolation};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("valid regex")
});

/// Length bounds and an optional pattern for one text field.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Text {
    min: usize,
    max: usize,
    pattern: Option<(&'static Regex, &'static str)>,
}

impl Text {
    pub(crate) const fn max(max: usize) -> Self {
        Self {
            min: 1,
            max,
            pattern: None,
        }
    }

    pub(crate) const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max,
            pattern: None,
        }
    }

    pub(crate) const fn pattern(mut self, regex: &'static Regex, message: &'static str) -> Self {
        self.pattern = Some((regex, message));
        self
    }

    pub(crate) fn email(self) -> Self {
        self.pattern(&EMAIL, "must be a valid email address")
    }

    fn check(&self, value: &str) -> Result<(), String> {
        let length = value.chars().count();
        if length < self.min || length > self.max {
            return Err(if self.min <= 1 {
                format!("must be at most {} characters", self.max)
            } else {
                format!("must be between {} and {} characters", self.min, self.max)
            });
        }
        match self.pattern {
            Some((regex, message)) if !regex.is_match(value) => Err(message.to_owned()),
            _ => Ok(()),
        }
    }
}

/// Accumulates field violations for one input.
#[derive(Debug, Default)]
pub(crate) struct FieldChecks {
    violations: Vec<FieldViolation>,
}

impl FieldChecks {
    /// Non-blank text within the rule; records a violation otherwise.
    pub(crate) fn required_text(
        &mut self,
        field: &str,
        value: Option<String>,
        rule: Text,
    ) -> Option<String> {
        let Some(text) = non_blank(value) else {
            self.violate(field, "is required");
            return None;
        };
        self.apply(field, text, rule)
    }

    /// Blank or absent text yields `None` without a violation.
    ///
    /// Patch inputs use this for every field: blank means "leave unchanged".
    pub(crate) fn optional_text(
        &mut self,
        field: &str,
        value: Option<String>,
        rule: Text,
    ) -> Option<String> {
        non_blank(value).and_then(|text| self.apply(field, text, rule))
    }

    /// A present value; records a violation when absent.
    pub(crate) fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.violate(field, "is required");
        }
        value
    }

    /// A strictly positive identity, when present.
    pub(crate) fn positive_id(&mut self, field: &str, value: Option<i64>) -> Option<i64> {
        match value {
            Some(id) if id < 1 => {
                self.violate(field, "must be a positive identifier");
                None
            }
            other => other,
        }
    }

    /// An integer inside `[min, max]`, when present.
    pub(crate) fn within(
        &mut self,
        field: &str,
        value: Option<i64>,
        min: i64,
        max: i64,
    ) -> Option<i64> {
        match value {
            Some(number) if !(min..=max).contains(&number) => {
                self.violate(field, format!("must be between {min} and {max}"));
                None
            }
            other => other,
        }
    }

    pub(crate) fn violate(&mut self, field: &str, message: impl Into<String>) {
        self.violations.push(FieldViolation::new(field, message));
    }

    /// Carry over the field violations of an error raised elsewhere.
    pub(crate) fn absorb(&mut self, error: &Error) {
        self.violations.extend(error.errors().iter().cloned());
    }

    pub(crate) fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub(crate) fn into_error(self) -> Error {
        Error::validation(self.violations)
    }

    pub(crate) fn finish(self) -> Result<(), Error> {
        if self.is_clean() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    fn apply(&mut self, field: &str, text: String, rule: Text) -> Option<String> {
        match rule.check(&text) {
            Ok(()) => Some(text),
            Err(message) => {
                self.violate(field, message);
                None
            }
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}
