//! Zonal statistics over polygon zones
//!
//! Each zone is a polygon with an integer identifier. A pixel belongs to a
//! zone when its center lies strictly inside the polygon, so pixels on a
//! shared edge are counted by neither neighbour.

use biasgrid_core::{Error, FeatureCollection, Raster, Result};
use geo::{BoundingRect, Contains, Geometry, MultiPolygon, Point};

/// A polygon zone with its identifier
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: i64,
    pub area: MultiPolygon<f64>,
}

/// Result of zonal statistics for one zone
#[derive(Debug, Clone, PartialEq)]
pub struct ZonalResult {
    pub zone_id: i64,
    /// Pixels with a valid value inside the zone
    pub count: usize,
    pub sum: f64,
    /// `None` when no valid pixel falls inside the zone
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Read zones from a polygon layer, taking identifiers from `id_field`.
///
/// Features without a polygon geometry are skipped.
pub fn zones_from_layer(layer: &FeatureCollection, id_field: &str) -> Result<Vec<Zone>> {
    let mut zones = Vec::with_capacity(layer.len());
    for (index, feature) in layer.iter().enumerate() {
        let area = match &feature.geometry {
            Some(Geometry::Polygon(p)) => MultiPolygon::new(vec![p.clone()]),
            Some(Geometry::MultiPolygon(mp)) => mp.clone(),
            _ => continue,
        };
        let id = feature
            .get_property(id_field)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| {
                Error::Other(format!(
                    "feature {} has no integer '{}' attribute",
                    index, id_field
                ))
            })?;
        zones.push(Zone { id, area });
    }
    Ok(zones)
}

/// Compute count, sum, mean, min and max of `raster` inside every zone.
///
/// NaN and nodata pixels are ignored. Results keep the order of `zones`.
pub fn zonal_statistics(raster: &Raster, zones: &[Zone]) -> Vec<ZonalResult> {
    let (rows, cols) = raster.shape();
    let transform = raster.transform();

    zones
        .iter()
        .map(|zone| {
            let mut result = ZonalResult {
                zone_id: zone.id,
                count: 0,
                sum: 0.0,
                mean: None,
                min: None,
                max: None,
            };

            let Some(rect) = zone.area.bounding_rect() else {
                return result;
            };
            let (row_range, col_range) = transform.window(
                (rect.min().x, rect.min().y, rect.max().x, rect.max().y),
                rows,
                cols,
            );

            for row in row_range {
                for col in col_range.clone() {
                    let value = raster.data()[[row, col]];
                    if raster.is_nodata(value) {
                        continue;
                    }
                    let (x, y) = transform.pixel_to_geo(col, row);
                    if !zone.area.contains(&Point::new(x, y)) {
                        continue;
                    }
                    result.count += 1;
                    result.sum += value;
                    result.min = Some(result.min.map_or(value, |m| m.min(value)));
                    result.max = Some(result.max.map_or(value, |m| m.max(value)));
                }
            }

            if result.count > 0 {
                result.mean = Some(result.sum / result.count as f64);
            }
            result
        })
        .collect()
}
