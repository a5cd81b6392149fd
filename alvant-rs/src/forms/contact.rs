use serde::Deserialize;

use super::{lenient_list, present, Validator};
use crate::error::FieldErrors;
use crate::storage::NewContact;

/// Body of `POST /api/contact`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub categories: Option<Vec<String>>,
}

impl ContactForm {
    /// Validate and normalize into a storable contact
    pub fn validate(&self) -> Result<NewContact, FieldErrors> {
        let mut v = Validator::new();

        let name = v.text("name", "Name", &self.name, 2);
        let email = v.email("email", &self.email);
        let phone = v.phone("phone", &self.phone);
        v.non_empty("categories", &self.categories, "Please select at least one category");
        v.finish()?;

        Ok(NewContact {
            name: name.to_string(),
            email: email.to_lowercase(),
            phone: phone.to_string(),
            message: present(&self.message).unwrap_or_default().to_string(),
            categories: self.categories.clone().unwrap_or_default(),
        })
    }
}
