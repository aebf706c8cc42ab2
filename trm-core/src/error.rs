//! Core error types for TRM.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Core error type for pricing, metrics, and boundary normalization.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Promo code not present in the rule table.
    #[error("Invalid promo code: {0}")]
    InvalidPromoCode(String),

    /// Promo code exists but is past its expiry.
    #[error("Promo code {code} expired at {expired_at}")]
    ExpiredPromoCode {
        /// The code as entered by the caller.
        code: String,
        /// When the code stopped being valid.
        expired_at: DateTime<Utc>,
    },

    /// Quantity below 1.
    #[error("Invalid quantity: {0} (must be at least 1)")]
    InvalidQuantity(u32),

    /// Rule table failed validation.
    #[error("Invalid rule table: {0}")]
    InvalidRules(String),

    /// Invalid data from API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The API answered with `success: false`.
    #[error("API error: {message}")]
    Api {
        /// Human-readable message from the server.
        message: String,
        /// Machine-readable error code, if any.
        code: Option<String>,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Returns true for errors a person can fix by changing their quote input.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidPromoCode(_)
                | CoreError::ExpiredPromoCode { .. }
                | CoreError::InvalidQuantity(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_errors() {
        assert!(CoreError::InvalidPromoCode("X".into()).is_user_facing());
        assert!(CoreError::InvalidQuantity(0).is_user_facing());
        assert!(!CoreError::InvalidRules("bad".into()).is_user_facing());
        assert!(!CoreError::InvalidData("bad".into()).is_user_facing());
    }

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidQuantity(0);
        assert_eq!(err.to_string(), "Invalid quantity: 0 (must be at least 1)");

        let err = CoreError::InvalidPromoCode("SAVE99".into());
        assert_eq!(err.to_string(), "Invalid promo code: SAVE99");
    }
}
