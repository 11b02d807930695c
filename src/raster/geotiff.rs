//! Single-band GeoTIFF reading and writing on top of the `tiff` crate.

use crate::raster::error::RasterError;
use crate::raster::frame::{Bounds, Crs, Raster};
use std::io::{Read, Seek, Write};
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

const GT_MODEL_TYPE_KEY: u32 = 1024;
const GT_RASTER_TYPE_KEY: u32 = 1025;
const GEOGRAPHIC_TYPE_KEY: u32 = 2048;
const PROJECTED_CS_TYPE_KEY: u32 = 3072;
const PROJ_COORD_TRANS_KEY: u32 = 3075;

const USER_DEFINED: u32 = 32767;
const CT_SINUSOIDAL: u32 = 24;

/// Decodes the first image of a GeoTIFF into a [`Raster`].
///
/// Multi-sample images keep their first band. Cells equal to the GDAL no-data
/// value become `NaN`. Images without a geokey directory are taken to be
/// EPSG:4326.
pub fn decode<R: Read + Seek>(reader: R) -> Result<Raster, RasterError> {
    let mut limits = Limits::default();
    limits.decoding_buffer_size = 1024 * 1024 * 1024;
    limits.intermediate_buffer_size = 1024 * 1024 * 1024;
    limits.ifd_value_size = 64 * 1024 * 1024;
    let mut decoder = Decoder::new(reader)?.with_limits(limits);

    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);
    let bounds = read_bounds(&mut decoder, width, height)?;
    let crs = read_crs(&mut decoder);
    let no_data = decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()
        .and_then(|s| s.trim().trim_end_matches('\0').parse::<f32>().ok());
    let samples = decoder
        .get_tag_u32(Tag::SamplesPerPixel)
        .unwrap_or(1)
        .max(1) as usize;

    let data = decode_samples(&mut decoder)?;
    if data.len() < width * height * samples {
        return Err(RasterError::UnsupportedLayout(format!(
            "expected {} samples, decoded {}",
            width * height * samples,
            data.len()
        )));
    }
    let values = data
        .into_iter()
        .step_by(samples)
        .take(width * height)
        .map(|v| match no_data {
            Some(nd) if v == nd || (nd.is_nan() && v.is_nan()) => f32::NAN,
            _ => v,
        })
        .collect();
    Raster::new(width, height, bounds, crs, values)
}

fn read_bounds<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    width: usize,
    height: usize,
) -> Result<Bounds, RasterError> {
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| RasterError::MissingGeoreference)?;
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| RasterError::MissingGeoreference)?;
    if tiepoint.len() < 6 || scale.len() < 2 {
        return Err(RasterError::MissingGeoreference);
    }
    // Tiepoint is [i, j, k, x, y, z]: raster cell (i, j) sits at model (x, y)
    let (i, j) = (tiepoint[0], tiepoint[1]);
    let (scale_x, scale_y) = (scale[0], scale[1].abs());
    let min_x = tiepoint[3] - i * scale_x;
    let max_y = tiepoint[4] + j * scale_y;
    Ok(Bounds::new(
        min_x,
        max_y - height as f64 * scale_y,
        min_x + width as f64 * scale_x,
        max_y,
    ))
}

fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Crs {
    let Ok(keys) = decoder.get_tag_u32_vec(Tag::GeoKeyDirectoryTag) else {
        return Crs::Wgs84;
    };
    // Header [version, revision, minor, count] then [id, location, count, value]
    let mut geographic = None;
    let mut projected = None;
    let mut transform = None;
    for entry in keys.chunks_exact(4).skip(1) {
        // location 0 means the value is stored inline
        if entry[1] != 0 {
            continue;
        }
        match entry[0] {
            GEOGRAPHIC_TYPE_KEY => geographic = Some(entry[3]),
            PROJECTED_CS_TYPE_KEY => projected = Some(entry[3]),
            PROJ_COORD_TRANS_KEY => transform = Some(entry[3]),
            _ => {}
        }
    }
    match (projected, transform) {
        (Some(USER_DEFINED), Some(CT_SINUSOIDAL)) => Crs::Sinusoidal,
        _ => projected
            .or(geographic)
            .map(Crs::from_epsg)
            .unwrap_or(Crs::Wgs84),
    }
}

fn decode_samples<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Vec<f32>, RasterError> {
    let values = match decoder.read_image()? {
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I16(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U8(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f32).collect(),
    };
    Ok(values)
}

/// Encodes `raster` as a single-band `f32` GeoTIFF with `NaN` as no-data.
pub fn encode<W: Write + Seek>(raster: &Raster, writer: W) -> Result<(), RasterError> {
    let bounds = raster.bounds();
    let (x_res, y_res) = raster.resolution();
    let crs = raster.crs();
    let model_type = if crs.is_geographic() { 2 } else { 1 };
    let mut keys: Vec<[u32; 4]> = vec![
        [GT_MODEL_TYPE_KEY, 0, 1, model_type],
        [GT_RASTER_TYPE_KEY, 0, 1, 1],
    ];
    match crs.epsg() {
        Some(code) if crs.is_geographic() => keys.push([GEOGRAPHIC_TYPE_KEY, 0, 1, code]),
        Some(code) => keys.push([PROJECTED_CS_TYPE_KEY, 0, 1, code]),
        None => {
            keys.push([PROJECTED_CS_TYPE_KEY, 0, 1, USER_DEFINED]);
            keys.push([PROJ_COORD_TRANS_KEY, 0, 1, CT_SINUSOIDAL]);
        }
    }
    let header = [1, 1, 0, keys.len() as u32];
    let geo_keys: Vec<u16> = header
        .iter()
        .chain(keys.iter().flatten())
        .map(|v| *v as u16)
        .collect();

    let mut encoder = TiffEncoder::new(writer)?;
    let mut image = encoder.new_image::<colortype::Gray32Float>(
        raster.width() as u32,
        raster.height() as u32,
    )?;
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &[x_res, y_res, 0.0][..])?;
    image.encoder().write_tag(
        Tag::ModelTiepointTag,
        &[0.0, 0.0, 0.0, bounds.min_x, bounds.max_y, 0.0][..],
    )?;
    image.encoder().write_tag(Tag::GeoKeyDirectoryTag, &geo_keys[..])?;
    image.encoder().write_tag(Tag::GdalNodata, "nan")?;
    image.write_data(raster.values())?;
    Ok(())
}
