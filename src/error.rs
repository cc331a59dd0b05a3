#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn invalid<T>(message: impl Into<String>) -> Result<T> {
    Err(Error::InvalidConfiguration(message.into()))
}

// Rejects NaN and infinities for any float coming out of a config file.
pub(crate) fn require_finite(name: &str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        invalid(format!("{} must be finite, got {}", name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_values_pass_through() {
        assert_eq!(require_finite("radius", 5.0), Ok(5.0));
        assert!(require_finite("radius", std::f32::NAN).is_err());
        assert!(require_finite("radius", std::f32::INFINITY).is_err());
    }

    #[test]
    fn message_names_the_problem() {
        let err = invalid::<()>("branches must be at least 1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: branches must be at least 1"
        );
    }
}
