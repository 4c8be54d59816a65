//! Route descriptor for carbon emission prediction requests

use serde::{Deserialize, Serialize};

/// A single logistics route to predict emissions for.
///
/// Field order matches the column order the model was fitted with
/// (see [`crate::models::gateway::MODEL_COLUMNS`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Origin warehouse/facility (e.g. "WH_Bangalore")
    pub origin_facility: String,

    /// Vehicle type (e.g. "truck", "van", "bike")
    pub vehicle_type: String,

    /// Route type (e.g. "highway", "urban", "mixed")
    pub route_type: String,

    /// Route distance in kilometers, strictly positive
    pub distance_km: f64,
}

impl RouteDescriptor {
    /// Trim whitespace from the text fields without changing case.
    pub fn normalize(&mut self) {
        self.origin_facility = self.origin_facility.trim().to_string();
        self.vehicle_type = self.vehicle_type.trim().to_string();
        self.route_type = self.route_type.trim().to_string();
    }

    /// Boundary validation: text fields non-empty after trimming,
    /// distance strictly positive. Vehicle/route vocabularies are
    /// advisory and not checked here; the model rejects unseen values.
    pub fn validate(&self) -> Result<(), String> {
        if self.origin_facility.trim().is_empty() {
            return Err("origin_facility must not be empty".to_string());
        }
        if self.vehicle_type.trim().is_empty() {
            return Err("vehicle_type must not be empty".to_string());
        }
        if self.route_type.trim().is_empty() {
            return Err("route_type must not be empty".to_string());
        }
        if !(self.distance_km > 0.0) {
            return Err("distance_km must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> RouteDescriptor {
        RouteDescriptor {
            origin_facility: "WH_Bangalore".to_string(),
            vehicle_type: "truck".to_string(),
            route_type: "highway".to_string(),
            distance_km: 350.0,
        }
    }

    #[test]
    fn test_valid_route() {
        assert!(route().validate().is_ok());
    }

    #[test]
    fn test_normalize_trims_text_fields() {
        let mut r = route();
        r.origin_facility = "  WH_Bangalore ".to_string();
        r.vehicle_type = " truck".to_string();
        r.normalize();
        assert_eq!(r.origin_facility, "WH_Bangalore");
        assert_eq!(r.vehicle_type, "truck");
    }

    #[test]
    fn test_empty_fields_rejected() {
        let mut r = route();
        r.origin_facility = "   ".to_string();
        assert!(r.validate().is_err());

        let mut r = route();
        r.route_type = String::new();
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_non_positive_distance_rejected() {
        let mut r = route();
        r.distance_km = 0.0;
        assert!(r.validate().is_err());

        r.distance_km = -12.5;
        assert!(r.validate().is_err());

        r.distance_km = f64::NAN;
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_deserializes_from_request_json() {
        let r: RouteDescriptor = serde_json::from_str(
            r#"{"origin_facility":"WH_Bangalore","vehicle_type":"truck","route_type":"highway","distance_km":350}"#,
        )
        .unwrap();
        assert_eq!(r, route());
    }
}
