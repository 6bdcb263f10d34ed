//! Field-level errors of create/edit forms.

use std::collections::BTreeMap;

use serde::Serialize;
use validator::{Validate, ValidationErrors};

use shipdesk_client::ApiError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub fields: BTreeMap<String, Vec<String>>,
    /// Error not tied to a field.
    pub root: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.root.is_none()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut form = Self::default();
        for (field, errs) in errors.field_errors() {
            for e in errs {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", e.code));
                form.add(field.to_string(), message);
            }
        }
        form
    }

    /// Place a service error on a field when its status is known for this
    /// form, otherwise on the root.
    pub fn from_api(error: &ApiError, field_by_status: &[(u16, &str)]) -> Self {
        let mut form = Self::default();
        match field_by_status
            .iter()
            .find(|(status, _)| error.is_status(*status))
        {
            Some((_, field)) => form.add(*field, error.message.clone()),
            None => form.root = Some(error.message.clone()),
        }
        form
    }
}

impl core::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        if let Some(root) = &self.root {
            f.write_str(root)?;
            first = false;
        }
        for (field, messages) in &self.fields {
            for m in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {m}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Run `validator` rules, turning failures into [`FormErrors`].
pub fn validate_form<T: Validate>(payload: &T) -> Result<(), FormErrors> {
    payload
        .validate()
        .map_err(|errors| FormErrors::from_validation(&errors))
}
