//! Request bodies. Every field is optional at the serde level so missing
//! fields become validation failures, never JSON rejections.

use serde::Deserialize;

use super::validation::{nullable, Validator, MAX_STRING_LENGTH};
use crate::database::models::{CollectionChanges, KeyChanges, KeyValueChanges, ProjectChanges};
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct SignUpPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

#[derive(Debug)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignUpPayload {
    pub fn validate(self) -> Result<SignUp, ApiError> {
        let mut v = Validator::new();
        let name = v.required("name", self.name.as_deref());
        v.max_length("name", name.as_deref(), MAX_STRING_LENGTH);
        let email = v.required("email", self.email.as_deref());
        v.email("email", email.as_deref());
        v.max_length("email", email.as_deref(), MAX_STRING_LENGTH);
        let password = v.password("password", self.password.as_deref());
        v.confirmed("password", password.as_deref(), self.password_confirmation.as_deref());
        v.finish()?;

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) => Ok(SignUp { name, email, password }),
            _ => Err(ApiError::internal_server_error("validation state mismatch")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SignInPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl SignInPayload {
    pub fn validate(self) -> Result<(String, String), ApiError> {
        let mut v = Validator::new();
        let email = v.required("email", self.email.as_deref());
        let password = v.password("password", self.password.as_deref());
        v.finish()?;

        email
            .zip(password)
            .ok_or_else(|| ApiError::internal_server_error("validation state mismatch"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ForgotPayload {
    pub email: Option<String>,
}

impl ForgotPayload {
    pub fn validate(self) -> Result<String, ApiError> {
        let mut v = Validator::new();
        let email = v.required("email", self.email.as_deref());
        v.email("email", email.as_deref());
        v.finish()?;
        email.ok_or_else(|| ApiError::internal_server_error("validation state mismatch"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetPayload {
    pub signature: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

impl ResetPayload {
    pub fn validate(self) -> Result<(String, String), ApiError> {
        let mut v = Validator::new();
        let signature = v.required("signature", self.signature.as_deref());
        let password = v.password("password", self.password.as_deref());
        v.confirmed("password", password.as_deref(), self.password_confirmation.as_deref());
        v.finish()?;

        signature
            .zip(password)
            .ok_or_else(|| ApiError::internal_server_error("validation state mismatch"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectPayload {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl ProjectPayload {
    /// `(name, description)` for a new project
    pub fn validate_create(self) -> Result<(String, Option<String>), ApiError> {
        let mut v = Validator::new();
        let name = v.required("name", self.name.as_deref());
        v.max_length("name", name.as_deref(), MAX_STRING_LENGTH);
        let description = v.nullable(self.description.as_ref().map(Option::as_deref)).flatten();
        v.finish()?;
        name.map(|name| (name, description))
            .ok_or_else(|| ApiError::internal_server_error("validation state mismatch"))
    }

    pub fn validate_update(self) -> Result<ProjectChanges, ApiError> {
        let mut v = Validator::new();
        let name = v.optional("name", self.name.as_deref());
        v.max_length("name", name.as_deref(), MAX_STRING_LENGTH);
        let description = v.nullable(self.description.as_ref().map(Option::as_deref));
        v.finish()?;
        Ok(ProjectChanges { name, description })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CollectionPayload {
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl CollectionPayload {
    /// `(code, name, description)` for a new collection
    pub fn validate_create(self) -> Result<(String, String, Option<String>), ApiError> {
        let mut v = Validator::new();
        let code = v.required("code", self.code.as_deref());
        v.max_length("code", code.as_deref(), MAX_STRING_LENGTH);
        let name = v.required("name", self.name.as_deref());
        v.max_length("name", name.as_deref(), MAX_STRING_LENGTH);
        let description = v.nullable(self.description.as_ref().map(Option::as_deref)).flatten();
        v.finish()?;
        match (code, name) {
            (Some(code), Some(name)) => Ok((code, name, description)),
            _ => Err(ApiError::internal_server_error("validation state mismatch")),
        }
    }

    pub fn validate_update(self) -> Result<CollectionChanges, ApiError> {
        let mut v = Validator::new();
        let code = v.optional("code", self.code.as_deref());
        v.max_length("code", code.as_deref(), MAX_STRING_LENGTH);
        let name = v.optional("name", self.name.as_deref());
        v.max_length("name", name.as_deref(), MAX_STRING_LENGTH);
        let description = v.nullable(self.description.as_ref().map(Option::as_deref));
        v.finish()?;
        Ok(CollectionChanges { code, name, description })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct KeyPayload {
    pub key: Option<String>,
}

impl KeyPayload {
    pub fn validate_create(self) -> Result<String, ApiError> {
        let mut v = Validator::new();
        let key = v.required("key", self.key.as_deref());
        v.max_length("key", key.as_deref(), MAX_STRING_LENGTH);
        v.finish()?;
        key.ok_or_else(|| ApiError::internal_server_error("validation state mismatch"))
    }

    pub fn validate_update(self) -> Result<KeyChanges, ApiError> {
        let mut v = Validator::new();
        let key = v.optional("key", self.key.as_deref());
        v.max_length("key", key.as_deref(), MAX_STRING_LENGTH);
        v.finish()?;
        Ok(KeyChanges { key })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct KeyValuePayload {
    pub value: Option<String>,
    pub language: Option<String>,
}

impl KeyValuePayload {
    /// `(value, language)` for a new key value
    pub fn validate_create(self) -> Result<(String, String), ApiError> {
        let mut v = Validator::new();
        let value = v.required("value", self.value.as_deref());
        let language = v.required("language", self.language.as_deref());
        v.max_length("language", language.as_deref(), MAX_STRING_LENGTH);
        v.finish()?;
        value
            .zip(language)
            .ok_or_else(|| ApiError::internal_server_error("validation state mismatch"))
    }

    pub fn validate_update(self) -> Result<KeyValueChanges, ApiError> {
        let mut v = Validator::new();
        let value = v.optional("value", self.value.as_deref());
        let language = v.optional("language", self.language.as_deref());
        v.max_length("language", language.as_deref(), MAX_STRING_LENGTH);
        v.finish()?;
        Ok(KeyValueChanges { value, language })
    }
}
