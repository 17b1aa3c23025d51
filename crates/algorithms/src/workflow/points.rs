//! Station point layer

use biasgrid_core::io::write_layer;
use biasgrid_core::{AttributeValue, Feature, FeatureCollection, Result, CRS};
use geo::Point;
use std::path::Path;
use tracing::{debug, info};

use super::stations::{StationTable, STATION_ID};
use crate::reference::ID_FIELD;

/// Point attribute and the summary column it is copied from
const RATIO_FIELDS: [(&str, &str); 14] = [
    ("Jan", "Jan_mean"),
    ("Feb", "Feb_mean"),
    ("Mar", "Mar_mean"),
    ("Apr", "Apr_mean"),
    ("May", "May_mean"),
    ("Jun", "Jun_mean"),
    ("Jul", "Jul_mean"),
    ("Aug", "Aug_mean"),
    ("Sep", "Sep_mean"),
    ("Oct", "Oct_mean"),
    ("Nov", "Nov_mean"),
    ("Dec", "Dec_mean"),
    ("grow_season", "April_to_oct_mean"),
    ("annual", "Annual_mean"),
];

/// One point per station carrying its monthly, growing season and annual
/// mean ratios. Columns absent from the summary become null attributes.
pub fn station_layer(stations: &StationTable) -> Result<FeatureCollection> {
    let rows = stations.stations()?;

    let mut ratios = Vec::with_capacity(RATIO_FIELDS.len());
    for (field, column) in RATIO_FIELDS {
        if stations.has_column(column) {
            ratios.push((field, Some(stations.table().f64_column(column)?)));
        } else {
            debug!("{} has no {} column", stations.path().display(), column);
            ratios.push((field, None));
        }
    }

    let mut layer = FeatureCollection::new(CRS::wgs84());
    for (i, station) in rows.iter().enumerate() {
        let mut feature = Feature::new(Point::new(station.lon, station.lat));
        for (field, values) in &ratios {
            let value = values
                .as_ref()
                .map_or(AttributeValue::Null, |v| AttributeValue::from(v[i]));
            feature.set_property(*field, value);
        }
        feature.set_property(STATION_ID, station.id.as_str());
        feature.set_property(
            ID_FIELD,
            station.gridmet_id.map_or(AttributeValue::Null, AttributeValue::Int),
        );
        layer.push(feature);
    }
    Ok(layer)
}

/// Write the station point layer, replacing any previous one
pub fn write_station_layer<P: AsRef<Path>>(stations: &StationTable, path: P) -> Result<usize> {
    let path = path.as_ref();
    let layer = station_layer(stations)?;
    write_layer(&layer, path)?;
    info!("wrote {} station points to {}", layer.len(), path.display());
    Ok(layer.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::stations::tests::summary_table;
    use biasgrid_core::io::read_layer;

    #[test]
    fn test_station_attributes() {
        let layer = station_layer(&summary_table()).unwrap();
        assert_eq!(layer.len(), 3);

        let first = &layer.features[0];
        assert_eq!(first.get_property("Jan").and_then(|v| v.as_f64()), Some(0.91));
        assert_eq!(first.get_property("annual").and_then(|v| v.as_f64()), Some(0.95));
        assert_eq!(first.get_property("Feb"), Some(&AttributeValue::Null));
        assert_eq!(first.get_property("STATION_ID").and_then(|v| v.as_str()), Some("MT001"));
        assert_eq!(first.get_property("GRIDMET_ID"), Some(&AttributeValue::Int(515902)));

        // missing ratio and missing cell id
        assert_eq!(layer.features[1].get_property("Jan"), Some(&AttributeValue::Null));
        assert_eq!(layer.features[2].get_property("GRIDMET_ID"), Some(&AttributeValue::Null));
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spatial").join("etr_mm_summary_pts.geojson");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale").unwrap();

        assert_eq!(write_station_layer(&summary_table(), &path).unwrap(), 3);
        let layer = read_layer(&path).unwrap();
        assert_eq!(layer.len(), 3);
        assert_eq!(layer.crs, Some(CRS::wgs84()));
    }
}
