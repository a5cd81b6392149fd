use serde::Deserialize;

use super::{lenient_list, Validator};
use crate::error::FieldErrors;
use crate::storage::NewRegisterInterest;

/// Body of `POST /api/register`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInterestForm {
    pub company_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "hasUAE")]
    pub has_uae: Option<String>,
    pub multi_country: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub line_of_business: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub categories: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub product_interest: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub markets: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub services: Option<Vec<String>>,
    pub captcha: Option<String>,
}

impl RegisterInterestForm {
    pub fn validate(&self) -> Result<NewRegisterInterest, FieldErrors> {
        let mut v = Validator::new();

        let company_name = v.text("companyName", "Company name", &self.company_name, 2);
        let first_name = v.text("firstName", "First name", &self.first_name, 2);
        let last_name = v.text("lastName", "Last name", &self.last_name, 2);
        let job_title = v.text("jobTitle", "Job title", &self.job_title, 2);
        let phone = v.phone("phone", &self.phone);
        let email = v.email("email", &self.email);
        let has_uae = v.yes_no("hasUAE", &self.has_uae);
        let multi_country = v.yes_no("multiCountry", &self.multi_country);
        v.non_empty(
            "lineOfBusiness",
            &self.line_of_business,
            "Please select at least one line of business",
        );
        v.non_empty(
            "productInterest",
            &self.product_interest,
            "Please select at least one product interest",
        );
        v.finish()?;

        Ok(NewRegisterInterest {
            company_name: company_name.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            job_title: job_title.to_string(),
            phone: phone.to_string(),
            email: email.to_lowercase(),
            has_uae: has_uae.to_string(),
            multi_country: multi_country.to_string(),
            line_of_business: self.line_of_business.clone().unwrap_or_default(),
            categories: self.categories.clone().unwrap_or_default(),
            product_interest: self.product_interest.clone().unwrap_or_default(),
            markets: self.markets.clone().unwrap_or_default(),
            services: self.services.clone().unwrap_or_default(),
            captcha: self.captcha.clone().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_json() -> serde_json::Value {
        json!({
            "companyName": " Acme Trading ",
            "firstName": "Omar",
            "lastName": "Haddad",
            "jobTitle": "COO",
            "phone": "+971 4 555 0100",
            "email": "OMAR@ACME.TEST",
            "hasUAE": "Yes",
            "multiCountry": " No ",
            "lineOfBusiness": ["Retail"],
            "productInterest": ["Payroll"],
            "markets": ["GCC"]
        })
    }

    #[test]
    fn test_list_fields_of_wrong_shape_reported_per_field() {
        let mut body = valid_json();
        body["lineOfBusiness"] = json!("Retail");
        body["productInterest"] = json!({ "name": "Payroll" });
        body["markets"] = json!(42);

        let form: RegisterInterestForm = serde_json::from_value(body).unwrap();
        assert!(form.markets.is_none());

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("lineOfBusiness"));
        assert!(errors.contains_key("productInterest"));
    }

    #[test]
    fn test_valid_registration() {
        let form: RegisterInterestForm = serde_json::from_value(valid_json()).unwrap();
        let new = form.validate().unwrap();

        assert_eq!(new.company_name, "Acme Trading");
        assert_eq!(new.email, "omar@acme.test");
        assert_eq!(new.multi_country, "No");
        assert_eq!(new.markets, vec!["GCC".to_string()]);
        assert!(new.services.is_empty());
        assert_eq!(new.captcha, "");
    }

    #[test]
    fn test_yes_no_fields() {
        let mut body = valid_json();
        body["hasUAE"] = json!("Maybe");
        body["multiCountry"] = json!("");

        let form: RegisterInterestForm = serde_json::from_value(body).unwrap();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors["hasUAE"], "Please select Yes or No");
        assert_eq!(errors["multiCountry"], "Please select an option");
    }

    #[test]
    fn test_required_lists() {
        let mut body = valid_json();
        body["lineOfBusiness"] = json!([]);
        body.as_object_mut().unwrap().remove("productInterest");

        let form: RegisterInterestForm = serde_json::from_value(body).unwrap();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("lineOfBusiness"));
        assert!(errors.contains_key("productInterest"));
    }

    #[test]
    fn test_short_names() {
        let mut body = valid_json();
        body["jobTitle"] = json!("X");

        let form: RegisterInterestForm = serde_json::from_value(body).unwrap();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors["jobTitle"], "Job title must be at least 2 characters long");
    }
}
