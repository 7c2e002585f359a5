use crate::core::currency::CurrencyCode;
use crate::core::pricing::ReceivableType;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors arising when submitting a receivable.
#[derive(Debug, Error)]
pub enum ReceivableError {
    #[error("face value must be greater than zero, got {0}")]
    NonPositiveFaceValue(Decimal),
    #[error("due date {0} must be in the future")]
    DueDateNotInFuture(DateTime<Utc>),
    #[error("document number cannot be blank")]
    BlankDocumentNumber,
}

/// A financial receivable (trade draft or post-dated check) ceded to the
/// fund for pricing and settlement.
///
/// Immutable once submitted; the settlement lifecycle lives on the
/// associated [`Settlement`](crate::core::settlement::Settlement) record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receivable {
    id: Uuid,
    cedent_id: Uuid,
    document_number: String,
    receivable_type: ReceivableType,
    face_value: Decimal,
    face_currency: CurrencyCode,
    due_date: DateTime<Utc>,
    submitted_at: DateTime<Utc>,
}

impl Receivable {
    /// Submit a new receivable. The due date must be strictly after `now`.
    pub fn new(
        cedent_id: Uuid,
        document_number: impl Into<String>,
        receivable_type: ReceivableType,
        face_value: Decimal,
        face_currency: CurrencyCode,
        due_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, ReceivableError> {
        if face_value <= Decimal::ZERO {
            return Err(ReceivableError::NonPositiveFaceValue(face_value));
        }
        if due_date <= now {
            return Err(ReceivableError::DueDateNotInFuture(due_date));
        }
        let document_number = document_number.into();
        if document_number.trim().is_empty() {
            return Err(ReceivableError::BlankDocumentNumber);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            cedent_id,
            document_number,
            receivable_type,
            face_value,
            face_currency,
            due_date,
            submitted_at: now,
        })
    }

    /// Term in months from `from` to the due date: ceil(days / 30),
    /// never below 1.
    pub fn term_in_months(&self, from: DateTime<Utc>) -> i32 {
        term_in_months(from, self.due_date)
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cedent_id(&self) -> Uuid {
        self.cedent_id
    }

    pub fn document_number(&self) -> &str {
        &self.document_number
    }

    pub fn receivable_type(&self) -> ReceivableType {
        self.receivable_type
    }

    pub fn face_value(&self) -> Decimal {
        self.face_value
    }

    pub fn face_currency(&self) -> &CurrencyCode {
        &self.face_currency
    }

    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

/// Ceiling of the day count between two instants divided by 30, floored
/// at 1. A due date in the past yields 1 here; callers validating
/// submission reject past due dates before pricing.
pub fn term_in_months(from: DateTime<Utc>, due_date: DateTime<Utc>) -> i32 {
    let seconds = (due_date - from).num_seconds();
    let days = seconds as f64 / 86_400.0;
    let months = (days / 30.0).ceil() as i32;
    months.max(1)
}
