//! Core order types for orderpad.
//!
//! This module defines the record type the rest of the crate operates on.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One customer's order: who it is for, where it goes, and what it is.
///
/// Records carry no identifier; a record is addressed only by its current
/// position in the order list. The serialized field names match the stored
/// blob format this tool inherited, so existing databases keep working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// The customer's name.
    #[serde(rename = "nomeCliente")]
    pub customer_name: String,

    /// The delivery address.
    #[serde(rename = "enderecoCliente")]
    pub customer_address: String,

    /// Free-form description of the order.
    #[serde(rename = "pedidoCliente")]
    pub order_details: String,
}

impl OrderRecord {
    /// Create a new record, rejecting empty fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyField`] naming the first field that is empty.
    pub fn new(
        customer_name: impl Into<String>,
        customer_address: impl Into<String>,
        order_details: impl Into<String>,
    ) -> Result<Self> {
        let record = Self {
            customer_name: customer_name.into(),
            customer_address: customer_address.into(),
            order_details: order_details.into(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Check the non-empty invariant on all three fields.
    ///
    /// Only emptiness is rejected; whitespace-only input is accepted, the
    /// same check the original form applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyField`] naming the first field that is empty.
    pub fn validate(&self) -> Result<()> {
        if self.customer_name.is_empty() {
            return Err(Error::empty_field("customer name"));
        }
        if self.customer_address.is_empty() {
            return Err(Error::empty_field("address"));
        }
        if self.order_details.is_empty() {
            return Err(Error::empty_field("order"));
        }
        Ok(())
    }
}
