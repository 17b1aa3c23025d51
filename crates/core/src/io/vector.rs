//! GeoJSON layers
//!
//! Layers are written as a single FeatureCollection carrying the legacy
//! `crs` member so the geographic reference system is declared explicitly.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::io::atomic::write_atomically;
use crate::vector::{AttributeValue, Feature, FeatureCollection};
use geojson::{GeoJson, JsonObject, JsonValue};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Read a GeoJSON FeatureCollection
pub fn read_layer<P: AsRef<Path>>(path: P) -> Result<FeatureCollection> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::missing_input(path, "vector layer does not exist"));
    }
    let text = std::fs::read_to_string(path)?;
    parse_layer(&text)
}

/// Parse GeoJSON text holding a FeatureCollection
pub fn parse_layer(text: &str) -> Result<FeatureCollection> {
    let collection = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc,
        other => {
            return Err(Error::Other(format!(
                "expected a FeatureCollection, found {}",
                geojson_kind(&other)
            )))
        }
    };

    let crs = collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.pointer("/properties/name"))
        .and_then(JsonValue::as_str)
        .and_then(CRS::parse);

    let mut layer = FeatureCollection {
        features: Vec::with_capacity(collection.features.len()),
        crs,
    };

    for feature in collection.features {
        let geometry = feature
            .geometry
            .map(|g| geo_types::Geometry::<f64>::try_from(g.value))
            .transpose()?;
        let properties = feature
            .properties
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key, attribute_from_json(value)))
            .collect();
        layer.features.push(Feature {
            geometry,
            properties,
        });
    }

    Ok(layer)
}

/// Write a FeatureCollection as GeoJSON, replacing `path` atomically
pub fn write_layer<P: AsRef<Path>>(layer: &FeatureCollection, path: P) -> Result<()> {
    let collection = to_geojson(layer);
    write_atomically(path, |file| {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &collection)
            .map_err(|e| Error::Other(format!("GeoJSON encode error: {}", e)))?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    })
}

fn to_geojson(layer: &FeatureCollection) -> geojson::FeatureCollection {
    let features = layer
        .iter()
        .map(|feature| {
            let properties: JsonObject = feature
                .properties
                .iter()
                .map(|(key, value)| (key.clone(), attribute_to_json(value)))
                .collect();
            geojson::Feature {
                bbox: None,
                geometry: feature
                    .geometry
                    .as_ref()
                    .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let foreign_members = layer.crs.as_ref().map(CRS::urn).map(|urn| {
        let mut members = JsonObject::new();
        members.insert(
            "crs".to_string(),
            serde_json::json!({ "type": "name", "properties": { "name": urn } }),
        );
        members
    });

    geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members,
    }
}

fn attribute_to_json(value: &AttributeValue) -> JsonValue {
    match value {
        AttributeValue::Null => JsonValue::Null,
        AttributeValue::Bool(b) => JsonValue::Bool(*b),
        AttributeValue::Int(i) => JsonValue::from(*i),
        AttributeValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        AttributeValue::String(s) => JsonValue::String(s.clone()),
    }
}

fn attribute_from_json(value: JsonValue) -> AttributeValue {
    match value {
        JsonValue::Null => AttributeValue::Null,
        JsonValue::Bool(b) => AttributeValue::Bool(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Int(i),
            None => n.as_f64().map_or(AttributeValue::Null, AttributeValue::Float),
        },
        JsonValue::String(s) => AttributeValue::String(s),
        other => AttributeValue::String(other.to_string()),
    }
}

fn geojson_kind(geojson: &GeoJson) -> &'static str {
    match geojson {
        GeoJson::Geometry(_) => "a bare Geometry",
        GeoJson::Feature(_) => "a single Feature",
        GeoJson::FeatureCollection(_) => "a FeatureCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{polygon, Point};

    fn sample_layer() -> FeatureCollection {
        let mut layer = FeatureCollection::new(CRS::wgs84());
        layer.push(
            Feature::new(polygon![
                (x: -110.0, y: 45.0),
                (x: -109.5, y: 45.0),
                (x: -109.5, y: 44.5),
                (x: -110.0, y: 44.5),
                (x: -110.0, y: 45.0),
            ])
            .with_property("GRIDMET_ID", -999_i64),
        );
        layer.push(
            Feature::new(Point::new(-109.75, 44.75))
                .with_property("STATION_ID", "MT001")
                .with_property("annual", 1.05)
                .with_property("Jan", f64::NAN),
        );
        layer
    }

    #[test]
    fn test_layer_file_keeps_features_and_crs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.geojson");
        let layer = sample_layer();

        write_layer(&layer, &path).unwrap();
        let loaded = read_layer(&path).unwrap();

        assert_eq!(loaded.crs, Some(CRS::wgs84()));
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.features[0].geometry, layer.features[0].geometry);
        assert_eq!(
            loaded.features[0].get_property("GRIDMET_ID"),
            Some(&AttributeValue::Int(-999))
        );
        assert_eq!(
            loaded.features[1].get_property("Jan"),
            Some(&AttributeValue::Null)
        );
        assert_eq!(
            loaded.features[1].get_property("annual").and_then(|v| v.as_f64()),
            Some(1.05)
        );
    }

    #[test]
    fn test_identical_layers_give_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.geojson");
        let b = dir.path().join("b.geojson");
        write_layer(&sample_layer(), &a).unwrap();
        write_layer(&sample_layer(), &b).unwrap();
        assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
    }

    #[test]
    fn test_rejects_non_collection() {
        let text = r#"{"type":"Point","coordinates":[1.0,2.0]}"#;
        assert!(parse_layer(text).is_err());
    }
}
