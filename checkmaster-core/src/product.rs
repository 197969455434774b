//! Product records under moderation.
//!
//! A product is a candidate that a reviewer approves or rejects. Identity and
//! creation time never change after construction; only `status` is mutated,
//! and only by replacing the whole record through a status-update action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype for product identifiers to prevent mixing with offsets and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Review status of a product.
///
/// This is the single canonical vocabulary. Snapshots written by older
/// clients used Spanish labels; those are accepted on read and normalized,
/// but only the English labels are ever written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    #[serde(alias = "pendiente")]
    Pending,
    #[serde(alias = "aprobado")]
    Approved,
    #[serde(alias = "rechazado")]
    Rejected,
}

impl ReviewStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns true once a reviewer has made a decision.
    pub fn is_reviewed(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A moderation candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Create a new pending product.
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            status: ReviewStatus::Pending,
            created_at,
        }
    }

    /// Copy of this product carrying a different status.
    pub fn with_status(&self, status: ReviewStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Product {
        let created_at = DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        Product::new(7u64, "Lamp", "A desk lamp", created_at)
    }

    #[test]
    fn test_new_product_is_pending() {
        assert_eq!(sample().status, ReviewStatus::Pending);
    }

    #[test]
    fn test_serializes_with_camel_case_timestamp_and_canonical_status() {
        let value = serde_json::to_value(sample().with_status(ReviewStatus::Approved)).unwrap();
        assert_eq!(value["id"], json!(7));
        assert_eq!(value["status"], json!("approved"));
        assert_eq!(value["createdAt"], json!("2025-01-02T03:04:05Z"));
    }

    #[test]
    fn test_legacy_status_labels_are_normalized() {
        for (legacy, expected) in [
            ("pendiente", ReviewStatus::Pending),
            ("aprobado", ReviewStatus::Approved),
            ("rechazado", ReviewStatus::Rejected),
        ] {
            let status: ReviewStatus = serde_json::from_value(json!(legacy)).unwrap();
            assert_eq!(status, expected);
            // Always written back in the canonical vocabulary
            assert_eq!(serde_json::to_value(status).unwrap(), json!(expected.label()));
        }
    }

    #[test]
    fn test_missing_status_defaults_to_pending() {
        let product: Product = serde_json::from_value(json!({
            "id": 1,
            "title": "t",
            "description": "d",
            "createdAt": "2025-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(product.status, ReviewStatus::Pending);
    }

    #[test]
    fn test_with_status_keeps_identity() {
        let original = sample();
        let rejected = original.with_status(ReviewStatus::Rejected);
        assert_eq!(rejected.id, original.id);
        assert_eq!(rejected.created_at, original.created_at);
        assert!(rejected.status.is_reviewed());
    }
}
