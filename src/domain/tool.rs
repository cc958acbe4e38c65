//! Tool listings

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::lenient;
use crate::error::{Result, ToolshareError};
use crate::geo::{Coordinate, Distance};

/// A rentable item listed by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: i64,

    /// Owner of the listing
    #[serde(default)]
    pub user_id: Option<i64>,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Daily price
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub price: f64,

    #[serde(default)]
    pub category: String,

    #[serde(default, deserialize_with = "lenient::optional_f64")]
    pub rating: Option<f64>,

    #[serde(default)]
    pub status: ToolStatus,

    #[serde(default, deserialize_with = "lenient::optional_f64")]
    pub latitude: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional_f64")]
    pub longitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Distance from the requesting user, attached by the nearby filter only
    #[serde(skip)]
    pub distance: Option<Distance>,
}

impl Tool {
    /// Validated position, None when either coordinate is missing or unusable
    pub fn position(&self) -> Option<Coordinate> {
        Coordinate::checked(self.latitude?, self.longitude?)
    }

    pub fn is_available(&self) -> bool {
        self.status == ToolStatus::Available
    }
}

/// Availability of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    #[serde(alias = "disponível", alias = "disponivel")]
    Available,
    #[serde(alias = "locada", alias = "alugada")]
    Rented,
    #[serde(alias = "em manutenção", alias = "em manutencao", alias = "manutenção")]
    Maintenance,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ToolStatus::Available => "available",
            ToolStatus::Rented => "rented",
            ToolStatus::Maintenance => "maintenance",
            ToolStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ToolStatus {
    type Err = ToolshareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "available" => Ok(ToolStatus::Available),
            "rented" => Ok(ToolStatus::Rented),
            "maintenance" => Ok(ToolStatus::Maintenance),
            other => Err(ToolshareError::InvalidInput(format!(
                "unknown tool status '{}' (expected available, rented or maintenance)",
                other
            ))),
        }
    }
}

/// Form for listing a new tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTool {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub rating: f64,
    pub status: ToolStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        category: impl Into<String>,
        position: Coordinate,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            category: category.into(),
            rating: 0.0,
            status: ToolStatus::Available,
            image: None,
            latitude: position.latitude,
            longitude: position.longitude,
        }
    }

    /// Reject forms the backend would only bounce back
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.description.trim().is_empty() || self.category.trim().is_empty() {
            return Err(ToolshareError::InvalidInput(
                "name, description and category are required".to_string(),
            ));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(ToolshareError::InvalidInput(format!(
                "price must be a positive number, got {}",
                self.price
            )));
        }
        if !self.rating.is_finite() || !(0.0..=5.0).contains(&self.rating) {
            return Err(ToolshareError::InvalidInput(format!(
                "rating must be between 0 and 5, got {}",
                self.rating
            )));
        }
        if self.status == ToolStatus::Unknown {
            return Err(ToolshareError::InvalidInput("tool status must be set".to_string()));
        }
        Coordinate::new(self.latitude, self.longitude)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "id": 7,
            "user_id": 3,
            "name": "Furadeira",
            "description": "Furadeira de impacto 700W",
            "price": 25.5,
            "category": "Ferramentas Elétricas",
            "rating": 4.5,
            "status": "disponível",
            "latitude": "-23.5505",
            "longitude": -46.6333,
            "image": null,
            "created_at": "2024-05-01T10:00:00.000Z",
            "updated_at": "2024-05-01T10:00:00.000Z"
        })
    }

    #[test]
    fn test_deserialize_mixed_coordinate_types() {
        let tool: Tool = serde_json::from_value(sample()).unwrap();
        assert_eq!(tool.id, 7);
        assert_eq!(tool.latitude, Some(-23.5505));
        assert_eq!(tool.longitude, Some(-46.6333));
        assert_eq!(tool.status, ToolStatus::Available);
        assert!(tool.distance.is_none());
        let pos = tool.position().unwrap();
        assert_eq!(pos.latitude, -23.5505);
    }

    #[test]
    fn test_malformed_coordinate_has_no_position() {
        let mut v = sample();
        v["latitude"] = json!("not-a-number");
        let tool: Tool = serde_json::from_value(v).unwrap();
        assert_eq!(tool.latitude, None);
        assert!(tool.position().is_none());
    }

    #[test]
    fn test_out_of_range_coordinate_has_no_position() {
        let mut v = sample();
        v["latitude"] = json!(123.0);
        let tool: Tool = serde_json::from_value(v).unwrap();
        assert_eq!(tool.latitude, Some(123.0));
        assert!(tool.position().is_none());
    }

    #[test]
    fn test_minimal_record() {
        let tool: Tool = serde_json::from_value(json!({"id": 1, "name": "Serra"})).unwrap();
        assert_eq!(tool.price, 0.0);
        assert_eq!(tool.status, ToolStatus::Unknown);
        assert!(tool.position().is_none());
    }

    #[test]
    fn test_status_aliases() {
        let parse = |s: &str| serde_json::from_value::<ToolStatus>(json!(s)).unwrap();
        assert_eq!(parse("available"), ToolStatus::Available);
        assert_eq!(parse("locada"), ToolStatus::Rented);
        assert_eq!(parse("alugada"), ToolStatus::Rented);
        assert_eq!(parse("rented"), ToolStatus::Rented);
        assert_eq!(parse("em manutenção"), ToolStatus::Maintenance);
        assert_eq!(parse("quebrada"), ToolStatus::Unknown);
    }

    #[test]
    fn test_distance_is_never_serialized() {
        let mut tool: Tool = serde_json::from_value(sample()).unwrap();
        tool.distance = Some(Distance::from_km(1.5));
        let out = serde_json::to_value(&tool).unwrap();
        assert!(out.get("distance").is_none());
        assert_eq!(out["status"], "available");
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Available".parse::<ToolStatus>().unwrap(), ToolStatus::Available);
        assert_eq!("maintenance".parse::<ToolStatus>().unwrap(), ToolStatus::Maintenance);
        assert!("broken".parse::<ToolStatus>().is_err());
    }

    #[test]
    fn test_new_tool_validation() {
        let here = Coordinate::new(-23.5505, -46.6333).unwrap();
        let form = NewTool::new("Serra", "Serra circular", 30.0, "Ferramentas Elétricas", here);
        assert!(form.validate().is_ok());

        let mut no_name = form.clone();
        no_name.name = "  ".to_string();
        assert!(no_name.validate().is_err());

        let mut free = form.clone();
        free.price = 0.0;
        assert!(free.validate().is_err());

        let mut overrated = form.clone();
        overrated.rating = 6.0;
        assert!(overrated.validate().is_err());
    }

    #[test]
    fn test_new_tool_serializes_without_empty_image() {
        let here = Coordinate::new(-23.5505, -46.6333).unwrap();
        let form = NewTool::new("Serra", "Serra circular", 30.0, "Acessórios", here);
        let out = serde_json::to_value(&form).unwrap();
        assert!(out.get("image").is_none());
        assert_eq!(out["status"], "available");
        assert_eq!(out["latitude"], -23.5505);
    }
}
