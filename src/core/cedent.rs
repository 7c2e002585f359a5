use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CedentError {
    #[error("cedent name cannot be blank")]
    BlankName,
    #[error("cedent tax id cannot be blank")]
    BlankTaxId,
}

/// A company ceding (selling) receivables to the fund.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cedent {
    id: Uuid,
    name: String,
    tax_id: String,
    registered_at: DateTime<Utc>,
}

impl Cedent {
    pub fn new(
        name: impl Into<String>,
        tax_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, CedentError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CedentError::BlankName);
        }
        let tax_id = tax_id.into();
        if tax_id.trim().is_empty() {
            return Err(CedentError::BlankTaxId);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            tax_id,
            registered_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tax_id(&self) -> &str {
        &self.tax_id
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cedent_creation() {
        let c = Cedent::new("Acme Distribuidora", "12.345.678/0001-90", Utc::now()).unwrap();
        assert_eq!(c.name(), "Acme Distribuidora");
        assert_eq!(c.tax_id(), "12.345.678/0001-90");
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(matches!(
            Cedent::new("  ", "12.345.678/0001-90", Utc::now()),
            Err(CedentError::BlankName)
        ));
    }

    #[test]
    fn test_blank_tax_id_rejected() {
        assert!(matches!(
            Cedent::new("Acme", "", Utc::now()),
            Err(CedentError::BlankTaxId)
        ));
    }
}
