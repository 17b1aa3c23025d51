//! Coordinate reference system tags
//!
//! Every layer produced by biasgrid lives in geographic WGS84 decimal
//! degrees. The CRS is still carried explicitly so writers can declare it
//! and readers can reject foreign inputs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EPSG code of geographic WGS84
pub const WGS84_EPSG: u32 = 4326;

/// Coordinate Reference System identified by its EPSG code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CRS {
    epsg: u32,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self { epsg: code }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(WGS84_EPSG)
    }

    /// Parse identifiers such as `EPSG:4326` or the OGC URN
    /// `urn:ogc:def:crs:EPSG::4326`.
    pub fn parse(identifier: &str) -> Option<Self> {
        let code = identifier.rsplit(':').next()?.trim();
        if !identifier.to_ascii_uppercase().contains("EPSG") {
            return None;
        }
        code.parse().ok().map(Self::from_epsg)
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    /// Whether this is geographic WGS84
    pub fn is_wgs84(&self) -> bool {
        self.epsg == WGS84_EPSG
    }

    /// OGC URN used in the GeoJSON `crs` member
    pub fn urn(&self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.epsg)
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

impl Default for CRS {
    fn default() -> Self {
        Self::wgs84()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crs_epsg() {
        let crs = CRS::wgs84();
        assert_eq!(crs.epsg(), 4326);
        assert_eq!(crs.to_string(), "EPSG:4326");
        assert_eq!(crs.urn(), "urn:ogc:def:crs:EPSG::4326");
    }

    #[test]
    fn test_crs_parse_identifiers() {
        assert_eq!(CRS::parse("EPSG:4326"), Some(CRS::wgs84()));
        assert_eq!(CRS::parse("urn:ogc:def:crs:EPSG::4326"), Some(CRS::wgs84()));
        assert_eq!(CRS::parse("urn:ogc:def:crs:OGC:1.3:CRS84"), None);
        assert!(!CRS::parse("EPSG:3857").unwrap().is_wgs84());
    }
}
