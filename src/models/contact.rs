//! Captured visitor contacts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Contact row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Contact {
    pub id: i64,
    pub business_id: i64,
    /// Identifier stored on the visitor device and presented on tap
    pub unique_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub visit_count: i32,
    pub last_visit_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Capture form submitted by the visitor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_reachable"))]
pub struct ContactForm {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 32, message = "Invalid phone number"))]
    pub phone: Option<String>,
}

fn validate_reachable(form: &ContactForm) -> Result<(), ValidationError> {
    let has = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    if has(&form.email) || has(&form.phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("contact_required");
        err.message = Some("An email or a phone number is required".into());
        Err(err)
    }
}

impl ContactForm {
    /// Trim fields and drop blank optional ones
    pub fn normalized(&self) -> ContactForm {
        let clean = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        ContactForm {
            name: self.name.trim().to_string(),
            email: clean(&self.email).map(|e| e.to_lowercase()),
            phone: clean(&self.phone),
        }
    }
}

/// Contact details carried by a visitor session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CapturedContact {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub unique_id: Option<String>,
}

impl CapturedContact {
    /// Merge a submitted form, keeping an id already assigned to this visitor
    pub fn from_form(form: &ContactForm, existing: Option<&CapturedContact>) -> Self {
        let form = form.normalized();
        CapturedContact {
            name: form.name,
            email: form.email,
            phone: form.phone,
            unique_id: existing.and_then(|c| c.unique_id.clone()),
        }
    }

    /// Keep the stored email or phone when this submission leaves it out
    pub fn fill_missing_from(&mut self, stored: &Contact) {
        if self.email.is_none() {
            self.email = stored.email.clone();
        }
        if self.phone.is_none() {
            self.phone = stored.phone.clone();
        }
    }
}

impl From<&Contact> for CapturedContact {
    fn from(contact: &Contact) -> Self {
        CapturedContact {
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            unique_id: Some(contact.unique_id.clone()),
        }
    }
}

/// Generate a new visitor identifier
pub fn generate_unique_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Query parameters for the merchant contact list
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ContactQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
