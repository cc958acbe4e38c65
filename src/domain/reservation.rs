//! Reservations of a tool for a date range

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient;
use super::tool::Tool;
use crate::error::{Result, ToolshareError};

/// A booking as the backend reports it. The life cycle is server-owned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,

    #[serde(default)]
    pub tool_id: Option<i64>,

    /// Requester
    #[serde(default)]
    pub user_id: Option<i64>,

    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub end_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "lenient::optional_f64")]
    pub total_price: Option<f64>,

    #[serde(default)]
    pub status: ReservationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    #[default]
    #[serde(alias = "pendente")]
    Pending,
    #[serde(alias = "confirmada")]
    Confirmed,
    #[serde(alias = "cancelada", alias = "canceled")]
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Reservation request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReservation {
    pub tool_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: f64,
}

impl NewReservation {
    /// Build a request for `tool` over `[start, end)`, priced per day.
    ///
    /// The end date must be strictly after the start date and the tool must
    /// currently be available.
    pub fn for_tool(tool: &Tool, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(ToolshareError::InvalidReservation(format!(
                "end date {} must be after start date {}",
                end, start
            )));
        }
        if !tool.is_available() {
            return Err(ToolshareError::ToolUnavailable(format!(
                "'{}' is {}",
                tool.name, tool.status
            )));
        }

        let days = (end - start).num_days();
        Ok(Self {
            tool_id: tool.id,
            start_date: start,
            end_date: end,
            total_price: days as f64 * tool.price,
        })
    }

    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ToolStatus;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn drill(status: ToolStatus) -> Tool {
        let mut tool: Tool = serde_json::from_value(json!({
            "id": 9,
            "name": "Furadeira",
            "price": 20.0,
            "latitude": -23.55,
            "longitude": -46.63
        }))
        .unwrap();
        tool.status = status;
        tool
    }

    #[test]
    fn test_for_tool_prices_per_day() {
        let r = NewReservation::for_tool(&drill(ToolStatus::Available), date("2024-05-01"), date("2024-05-04")).unwrap();
        assert_eq!(r.tool_id, 9);
        assert_eq!(r.days(), 3);
        assert_eq!(r.total_price, 60.0);
    }

    #[test]
    fn test_for_tool_rejects_inverted_window() {
        let tool = drill(ToolStatus::Available);
        let same_day = NewReservation::for_tool(&tool, date("2024-05-01"), date("2024-05-01"));
        assert!(matches!(same_day, Err(ToolshareError::InvalidReservation(_))));

        let inverted = NewReservation::for_tool(&tool, date("2024-05-03"), date("2024-05-01"));
        assert!(matches!(inverted, Err(ToolshareError::InvalidReservation(_))));
    }

    #[test]
    fn test_for_tool_rejects_unavailable() {
        for status in [ToolStatus::Rented, ToolStatus::Maintenance, ToolStatus::Unknown] {
            let r = NewReservation::for_tool(&drill(status), date("2024-05-01"), date("2024-05-02"));
            assert!(matches!(r, Err(ToolshareError::ToolUnavailable(_))));
        }
    }

    #[test]
    fn test_request_body_dates() {
        let r = NewReservation::for_tool(&drill(ToolStatus::Available), date("2024-05-01"), date("2024-05-02")).unwrap();
        let body = serde_json::to_value(&r).unwrap();
        assert_eq!(body["start_date"], "2024-05-01");
        assert_eq!(body["end_date"], "2024-05-02");
        assert_eq!(body["tool_id"], 9);
    }

    #[test]
    fn test_deserialize_backend_reservation() {
        let r: Reservation = serde_json::from_value(json!({
            "id": 1,
            "user_id": 2,
            "tool_id": 9,
            "start_date": "2024-05-01T00:00:00.000Z",
            "end_date": "2024-05-03",
            "total_price": "40.00",
            "status": "pendente"
        }))
        .unwrap();
        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(r.start_date, Some(date("2024-05-01")));
        assert_eq!(r.end_date, Some(date("2024-05-03")));
        assert_eq!(r.total_price, Some(40.0));
    }

    #[test]
    fn test_status_aliases() {
        let parse = |s: &str| serde_json::from_value::<ReservationStatus>(json!(s)).unwrap();
        assert_eq!(parse("confirmada"), ReservationStatus::Confirmed);
        assert_eq!(parse("cancelled"), ReservationStatus::Cancelled);
        assert_eq!(parse("canceled"), ReservationStatus::Cancelled);
        assert_eq!(parse("archived"), ReservationStatus::Unknown);
    }
}
