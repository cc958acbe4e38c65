//! Users, credentials and profile forms

use std::fmt;

use serde::{Deserialize, Serialize};

use super::lenient;
use crate::error::{Result, ToolshareError};
use crate::geo::Coordinate;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Lists tools for rent
    #[serde(alias = "locador")]
    Owner,
    /// Rents tools from others
    #[serde(alias = "locatário", alias = "locatario")]
    Renter,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserType::Owner => "owner",
            UserType::Renter => "renter",
            UserType::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Email/password pair for `POST /session`
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Both fields present and the email looks like an address
    pub fn validate(&self) -> Result<()> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(ToolshareError::InvalidInput("email and password are required".to_string()));
        }
        if !looks_like_email(&self.email) {
            return Err(ToolshareError::InvalidInput(format!("'{}' is not a valid email", self.email)));
        }
        Ok(())
    }
}

/// `local@domain.tld` with no whitespace
pub(crate) fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// A user record from `GET /user/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_f64")]
    pub longitude: Option<f64>,
    #[serde(default, rename = "type")]
    pub user_type: Option<UserType>,
}

impl UserProfile {
    pub fn position(&self) -> Option<Coordinate> {
        Coordinate::checked(self.latitude?, self.longitude?)
    }
}

/// Registration form for `POST /user`
#[derive(Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub cpf: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("password", &self.password),
            ("phone", &self.phone),
            ("cpf", &self.cpf),
            ("address", &self.address),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ToolshareError::InvalidInput(format!("{} is required", field)));
        }
        if !looks_like_email(self.email.trim()) {
            return Err(ToolshareError::InvalidInput(format!("'{}' is not a valid email", self.email)));
        }
        Coordinate::new(self.latitude, self.longitude)?;
        Ok(())
    }
}

/// Body for `PUT /user/{id}`. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cpf: String,
    pub address: String,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<()> {
        let fields = [&self.name, &self.email, &self.phone, &self.cpf, &self.address];
        if fields.iter().any(|v| v.trim().is_empty()) {
            return Err(ToolshareError::InvalidInput("all profile fields are required".to_string()));
        }
        if !looks_like_email(self.email.trim()) {
            return Err(ToolshareError::InvalidInput(format!("'{}' is not a valid email", self.email)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("ana@example.com"));
        assert!(looks_like_email("a.b+c@mail.example.com.br"));
        assert!(!looks_like_email("ana@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ana@.com"));
        assert!(!looks_like_email("ana@example."));
        assert!(!looks_like_email("ana @example.com"));
        assert!(!looks_like_email("ana@@example.com"));
        assert!(!looks_like_email(""));
    }

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new(" ana@example.com ", "secret").validate().is_ok());
        assert!(Credentials::new("", "secret").validate().is_err());
        assert!(Credentials::new("ana@example.com", "").validate().is_err());
        assert!(Credentials::new("ana", "secret").validate().is_err());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("ana@example.com", "hunter2");
        let out = format!("{:?}", creds);
        assert!(out.contains("ana@example.com"));
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn test_profile_deserialize() {
        let p: UserProfile = serde_json::from_value(json!({
            "id": 3,
            "name": "Ana",
            "email": "ana@example.com",
            "phone": "11999990000",
            "cpf": "12345678900",
            "address": "Rua A, 1",
            "latitude": "-23.5505",
            "longitude": "-46.6333",
            "type": "locatário"
        }))
        .unwrap();
        assert_eq!(p.user_type, Some(UserType::Renter));
        assert!(p.position().is_some());
    }

    #[test]
    fn test_profile_update_requires_every_field() {
        let update = ProfileUpdate {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: "11999990000".to_string(),
            cpf: "12345678900".to_string(),
            address: "Rua A, 1".to_string(),
        };
        assert!(update.validate().is_ok());

        let mut missing = update.clone();
        missing.address = " ".to_string();
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_new_user_validation() {
        let user = NewUser {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "secret".to_string(),
            phone: "11999990000".to_string(),
            cpf: "12345678900".to_string(),
            address: "Rua A, 1".to_string(),
            latitude: -23.5505,
            longitude: -46.6333,
        };
        assert!(user.validate().is_ok());
        assert!(!format!("{:?}", user).contains("secret"));

        let mut no_cpf = user.clone();
        no_cpf.cpf = String::new();
        let err = no_cpf.validate().unwrap_err();
        assert!(err.to_string().contains("cpf"));

        let mut off_map = user.clone();
        off_map.latitude = 200.0;
        assert!(off_map.validate().is_err());
    }
}
