use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// GeoJSON point. Coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    #[schema(example = "Point")]
    pub kind: String,
    #[schema(value_type = Vec<f64>, example = json!([31.2357, 30.0444]))]
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.kind != "Point" {
            return Err("location.type must be 'Point'".to_string());
        }
        let (lng, lat) = (self.longitude(), self.latitude());
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err("longitude must be between -180 and 180".to_string());
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err("latitude must be between -90 and 90".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_geojson() {
        let json = serde_json::to_value(GeoPoint::new(31.2, 30.1)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Point", "coordinates": [31.2, 30.1]}));
    }

    #[test]
    fn coordinate_order_is_longitude_first() {
        let p: GeoPoint =
            serde_json::from_str(r#"{"type":"Point","coordinates":[-73.98,40.75]}"#).unwrap();
        assert_eq!(p.longitude(), -73.98);
        assert_eq!(p.latitude(), 40.75);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_and_wrong_type() {
        assert!(GeoPoint::new(40.0, 120.0).validate().is_err());
        assert!(GeoPoint::new(190.0, 10.0).validate().is_err());
        let mut p = GeoPoint::new(1.0, 1.0);
        p.kind = "Polygon".into();
        assert!(p.validate().is_err());
    }
}
