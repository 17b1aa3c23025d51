//! GeoTIFF reading/writing through the `tiff` crate
//!
//! Surfaces are stored as single-band 32-bit float images with the
//! ModelPixelScale / ModelTiepoint tags for georeferencing and a GeoKey
//! directory declaring a geographic model and its EPSG code.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::io::atomic::write_atomically;
use crate::raster::{GeoTransform, Raster};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// Read a GeoTIFF file into a Raster
pub fn read_geotiff<P: AsRef<Path>>(path: P) -> Result<Raster> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::missing_input(path, "raster does not exist"));
    }
    let file = File::open(path)?;
    decode_geotiff(file)
}

/// Read a GeoTIFF from an in-memory buffer into a Raster
pub fn read_geotiff_from_buffer(data: &[u8]) -> Result<Raster> {
    decode_geotiff(Cursor::new(data))
}

fn decode_geotiff<R>(reader: R) -> Result<Raster>
where
    R: std::io::Read + std::io::Seek,
{
    let mut decoder = Decoder::new(reader)?;
    let (width, height) = decoder.dimensions()?;
    let rows = height as usize;
    let cols = width as usize;

    let data: Vec<f64> = match decoder.read_image()? {
        DecodingResult::F32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F64(buf) => buf,
        DecodingResult::U8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(f64::from).collect(),
        _ => return Err(Error::Other("Unsupported TIFF pixel format".to_string())),
    };

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Some(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    raster.set_crs(read_crs(&mut decoder));

    if let Ok(text) = decoder.get_tag_ascii_string(Tag::from_u16_exhaustive(GDAL_NODATA)) {
        raster.set_nodata(text.trim_matches(char::from(0)).trim().parse().ok());
    }

    Ok(raster)
}

/// GeoTransform from ModelPixelScale + ModelTiepoint
fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE)).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TIEPOINT)).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

/// EPSG code from the GeoKey directory, if declared
fn read_crs<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<CRS> {
    let keys = decoder.get_tag_u16_vec(Tag::from_u16_exhaustive(GEO_KEY_DIRECTORY)).ok()?;
    // header: version, revision, minor, key count; then 4 shorts per key
    let count = *keys.get(3)? as usize;
    keys.get(4..4 + count * 4)?
        .chunks_exact(4)
        .find(|entry| {
            (entry[0] == GEOGRAPHIC_TYPE_KEY || entry[0] == PROJECTED_CS_TYPE_KEY) && entry[1] == 0
        })
        .map(|entry| CRS::from_epsg(u32::from(entry[3])))
}

/// Write a Raster to a GeoTIFF file.
///
/// The file is encoded next to `path` and renamed into place once complete,
/// so an existing raster is never left half-written.
pub fn write_geotiff<P: AsRef<Path>>(raster: &Raster, path: P) -> Result<()> {
    write_atomically(path, |file| encode_geotiff(raster, file))
}

/// Write a Raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer(raster: &Raster) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn geokeys(crs: Option<&CRS>) -> Vec<u16> {
    let epsg = crs.and_then(|c| u16::try_from(c.epsg()).ok());
    let geographic = crs.map_or(true, |c| c.is_wgs84());

    let mut keys = vec![
        1, 1, 0, 2,
        GT_MODEL_TYPE_KEY, 0, 1,
        if geographic { MODEL_TYPE_GEOGRAPHIC } else { MODEL_TYPE_PROJECTED },
        GT_RASTER_TYPE_KEY, 0, 1, RASTER_PIXEL_IS_AREA,
    ];
    if let Some(code) = epsg {
        let key = if geographic { GEOGRAPHIC_TYPE_KEY } else { PROJECTED_CS_TYPE_KEY };
        keys.extend_from_slice(&[key, 0, 1, code]);
        keys[3] = 3;
    }
    keys
}

fn encode_geotiff<W>(raster: &Raster, writer: W) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    let mut encoder = TiffEncoder::new(writer)?;
    let (rows, cols) = raster.shape();

    let data: Vec<f32> = raster.data().iter().map(|&v| v as f32).collect();

    let mut image = encoder.new_image::<Gray32Float>(cols as u32, rows as u32)?;

    let gt = raster.transform();
    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), &scale[..])?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_TIEPOINT), &tiepoint[..])?;

    let keys = geokeys(raster.crs());
    image
        .encoder()
        .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), keys.as_slice())?;

    if let Some(nodata) = raster.nodata() {
        let text = nodata.to_string();
        image
            .encoder()
            .write_tag(Tag::Unknown(GDAL_NODATA), text.as_str())?;
    }

    image.write_data(&data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_raster() -> Raster {
        let mut raster = Raster::new(3, 4)
            .with_transform(GeoTransform::north_up(-110.0, 45.0, 0.25))
            .with_crs(CRS::wgs84());
        for row in 0..3 {
            for col in 0..4 {
                raster.set(row, col, (row * 4 + col) as f64 * 0.5).unwrap();
            }
        }
        raster
    }

    #[test]
    fn test_buffer_preserves_georeferencing() {
        let raster = sample_raster();
        let bytes = write_geotiff_to_buffer(&raster).unwrap();
        let loaded = read_geotiff_from_buffer(&bytes).unwrap();

        assert_eq!(loaded.shape(), (3, 4));
        assert_relative_eq!(loaded.get(2, 3).unwrap(), 5.5, epsilon = 1e-6);
        let gt = loaded.transform();
        assert_relative_eq!(gt.origin_x, -110.0, epsilon = 1e-12);
        assert_relative_eq!(gt.origin_y, 45.0, epsilon = 1e-12);
        assert_relative_eq!(gt.pixel_height, -0.25, epsilon = 1e-12);
        assert_eq!(loaded.crs().map(|c| c.epsg()), Some(4326));
    }

    #[test]
    fn test_geokeys_declare_geographic_wgs84() {
        let keys = geokeys(Some(&CRS::wgs84()));
        assert_eq!(keys[3], 3);
        assert_eq!(&keys[4..8], &[GT_MODEL_TYPE_KEY, 0, 1, MODEL_TYPE_GEOGRAPHIC]);
        assert_eq!(&keys[12..16], &[GEOGRAPHIC_TYPE_KEY, 0, 1, 4326]);
    }

    #[test]
    fn test_write_file_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Annual_mean.tiff");
        std::fs::write(&path, b"stale").unwrap();

        write_geotiff(&sample_raster(), &path).unwrap();
        let loaded = read_geotiff(&path).unwrap();
        assert_eq!(loaded.shape(), (3, 4));

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temporary file should be renamed into place");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_geotiff("/nonexistent/Annual_mean.tiff").unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
    }
}
