//! Post-decode invariant checks

use chrono::TimeDelta;

/// A decoded configuration violates one of its invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{name} must be a positive duration, got: {}", format_delta(.value))]
    NegativeDuration { name: String, value: TimeDelta },

    #[error("{name}: {message}")]
    Invalid { name: String, message: String },
}

impl ValidationError {
    pub fn invalid(name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Invalid {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

/// Render like the environment syntax: `-5m`, `1h 30m`, `0s`.
fn format_delta(value: &TimeDelta) -> String {
    let magnitude = value.abs().to_std().unwrap_or_default();
    let sign = if *value < TimeDelta::zero() { "-" } else { "" };
    format!("{sign}{}", humantime::format_duration(magnitude))
}

/// Fails when `value` is negative. Zero is accepted.
pub fn non_negative(name: &str, value: TimeDelta) -> Result<(), ValidationError> {
    if value < TimeDelta::zero() {
        return Err(ValidationError::NegativeDuration {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

/// Checks each `(name, value)` pair in order and reports the first negative one.
pub fn check_durations<'a, I>(durations: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = (&'a str, TimeDelta)>,
{
    durations
        .into_iter()
        .try_for_each(|(name, value)| non_negative(name, value))
}
