//! Due type domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Template of a recurring due.
///
/// A flat fee has `requires_beneficiary == false`; an assistance due supports
/// a specific member and has `requires_beneficiary == true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueType {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_amount: Decimal,
    pub mandatory: bool,
    pub active: bool,
    pub display_order: i32,
    pub requires_beneficiary: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a due type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDueType {
    pub name: String,
    pub description: Option<String>,
    pub unit_amount: Decimal,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub requires_beneficiary: bool,
}

fn default_true() -> bool {
    true
}

impl NewDueType {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_amount(self.unit_amount)?;
        validate_display_order(self.display_order)
    }
}

/// Partial update of a due type; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueTypeUpdate {
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
    pub unit_amount: Option<Decimal>,
    pub mandatory: Option<bool>,
    pub active: Option<bool>,
    pub display_order: Option<i32>,
    pub requires_beneficiary: Option<bool>,
}

impl DueTypeUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(amount) = self.unit_amount {
            validate_amount(amount)?;
        }
        if let Some(order) = self.display_order {
            validate_display_order(order)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.unit_amount.is_none()
            && self.mandatory.is_none()
            && self.active.is_none()
            && self.display_order.is_none()
            && self.requires_beneficiary.is_none()
    }

    /// Applies the present fields onto an existing due type.
    pub fn apply_to(self, due_type: &mut DueType) {
        if let Some(name) = self.name {
            due_type.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            due_type.description = description;
        }
        if let Some(amount) = self.unit_amount {
            due_type.unit_amount = amount;
        }
        if let Some(mandatory) = self.mandatory {
            due_type.mandatory = mandatory;
        }
        if let Some(active) = self.active {
            due_type.active = active;
        }
        if let Some(order) = self.display_order {
            due_type.display_order = order;
        }
        if let Some(requires) = self.requires_beneficiary {
            due_type.requires_beneficiary = requires;
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid("Due type name cannot be empty"));
    }
    Ok(())
}

fn validate_amount(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(Error::invalid(format!(
            "Unit amount cannot be negative, got {}",
            amount
        )));
    }
    Ok(())
}

fn validate_display_order(order: i32) -> Result<()> {
    if order < 0 {
        return Err(Error::invalid(format!(
            "Display order cannot be negative, got {}",
            order
        )));
    }
    Ok(())
}

/// Distinguishes "field absent" from "field explicitly null".
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
