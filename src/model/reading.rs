//! Weather telemetry readings

use crate::compose::{Extremal, SparseFilter};
use crate::error::RequestError;
use crate::store::{RecordId, Selector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use weather_records_macros::{Document, SparsePatch};

/// Stored field names of [`Reading`]
pub mod fields {
    pub const ID: &str = "id";
    pub const DEVICE_NAME: &str = "device_name";
    pub const TIME: &str = "time";
    pub const TEMPERATURE: &str = "temperature";
}

/// A single observation from a weather station
///
/// Every measurement is optional; an absent value is distinct from zero.
/// The identity is assigned by the store and ignored on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[serde(rename_all = "camelCase")]
#[document(collection = "WeatherData")]
pub struct Reading {
    #[document(id)]
    #[serde(default, skip_deserializing)]
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    /// Time of observation
    pub time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// °C
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// kPa
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmospheric_pressure: Option<f64>,
    /// m/s
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wind_speed: Option<f64>,
    /// W/m²
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solar_radiation: Option<f64>,
    /// kPa
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vapor_pressure: Option<f64>,
    /// %
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<f64>,
    /// mm/h
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
}

impl Reading {
    /// A reading at `time` with no measurements
    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::default(),
            device_name: None,
            time,
            latitude: None,
            longitude: None,
            temperature: None,
            atmospheric_pressure: None,
            max_wind_speed: None,
            solar_radiation: None,
            vapor_pressure: None,
            humidity: None,
            wind_direction: None,
            precipitation: None,
        }
    }
}

/// Sparse selection of readings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingFilter {
    /// Inclusive lower bound on observation time
    pub recorded_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on observation time
    pub recorded_to: Option<DateTime<Utc>>,
    /// Literal substring of the device label
    pub device_match: Option<String>,
    /// Exact observation time
    pub date_time_match: Option<DateTime<Utc>>,
    /// Keep only the readings with the highest temperature
    #[serde(alias = "highestTemp")]
    pub highest_temperature: Option<bool>,
}

impl ReadingFilter {
    fn device_text(&self) -> Option<&str> {
        self.device_match
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    fn wants_highest(&self) -> bool {
        self.highest_temperature == Some(true)
    }
}

impl SparseFilter for ReadingFilter {
    type Document = Reading;

    fn is_empty(&self) -> bool {
        self.recorded_from.is_none()
            && self.recorded_to.is_none()
            && self.device_text().is_none()
            && self.date_time_match.is_none()
            && !self.wants_highest()
    }

    fn base_selector(&self) -> Result<Selector, RequestError> {
        let mut selector = Selector::All;
        if let Some(from) = self.recorded_from {
            selector &= Selector::gte(fields::TIME, from);
        }
        if let Some(to) = self.recorded_to {
            selector &= Selector::lte(fields::TIME, to);
        }
        if let Some(text) = self.device_text() {
            selector &= Selector::contains_literal(fields::DEVICE_NAME, text)
                .map_err(|e| RequestError::InvalidArgument(format!("device match: {}", e)))?;
        }
        if let Some(at) = self.date_time_match {
            selector &= Selector::eq(fields::TIME, at);
        }
        Ok(selector)
    }

    fn extremal(&self) -> Option<Extremal> {
        self.wants_highest()
            .then(|| Extremal::highest(fields::TEMPERATURE))
    }
}

/// Sparse update of readings selected by an embedded filter
#[derive(Debug, Clone, Default, Deserialize, SparsePatch)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPatch {
    pub device_name: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub temperature: Option<f64>,
    pub atmospheric_pressure: Option<f64>,
    pub max_wind_speed: Option<f64>,
    pub solar_radiation: Option<f64>,
    pub vapor_pressure: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_direction: Option<f64>,
    pub precipitation: Option<f64>,
    #[serde(default)]
    #[patch(filter)]
    pub filter: ReadingFilter,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::SparsePatch;
    use crate::store::Value;

    #[test]
    fn test_deserialize_ignores_identity_and_keeps_absence() {
        let json = r#"{"id":"0d2c2b5e-9d7b-4a53-9d9a-5a3c3c2d1e0f","time":"2024-03-01T10:00:00Z","temperature":21.5}"#;
        let reading: Reading = serde_json::from_str(json).unwrap();
        assert!(reading.id.is_unassigned());
        assert_eq!(reading.temperature, Some(21.5));
        assert_eq!(reading.humidity, None);
    }

    #[test]
    fn test_serialize_omits_absent_measurements() {
        let mut reading = Reading::at("2024-03-01T10:00:00Z".parse().unwrap());
        reading.humidity = Some(0.0);
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["humidity"], 0.0);
        assert!(json.get("temperature").is_none());
        assert!(json.get("deviceName").is_none());
    }

    #[test]
    fn test_blank_device_match_is_absent() {
        let filter = ReadingFilter {
            device_match: Some("   ".into()),
            ..Default::default()
        };
        assert!(filter.is_empty());
        assert!(filter.base_selector().unwrap().is_all());
    }

    #[test]
    fn test_highest_false_contributes_nothing() {
        let filter = ReadingFilter {
            highest_temperature: Some(false),
            ..Default::default()
        };
        assert!(filter.is_empty());
        assert!(filter.extremal().is_none());
    }

    #[test]
    fn test_filter_accepts_short_alias() {
        let filter: ReadingFilter = serde_json::from_str(r#"{"highestTemp":true}"#).unwrap();
        assert_eq!(filter.highest_temperature, Some(true));
    }

    #[test]
    fn test_patch_present_fields() {
        let patch: ReadingPatch = serde_json::from_str(
            r#"{"humidity":80,"deviceName":"","filter":{"deviceMatch":"North"}}"#,
        )
        .unwrap();
        assert_eq!(
            patch.present_fields(),
            vec![("humidity", Value::Number(80.0))]
        );
        assert_eq!(patch.filter().device_match.as_deref(), Some("North"));
    }
}
