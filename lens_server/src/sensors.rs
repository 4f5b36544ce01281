//! Camera access and frame encoding.
//!
use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use image::{codecs::jpeg::JpegEncoder, RgbImage};
use rscam::{Camera, Config};

/// JPEG quality used for snapshots sent to the detection endpoint.
pub const SNAPSHOT_JPEG_QUALITY: u8 = 95;

/// Produce the next camera frame, `None` when capturing failed.
pub type CaptureFn = Box<dyn Fn() -> Option<CapturedFrame> + Send + Sync>;

/// Pixel layout of a captured frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PixelFormat {
    Mjpeg,
    Rgb24,
}

/// One frame as delivered by the camera.
#[derive(Clone, Debug)]
pub struct CapturedFrame {
    pub pixel: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub data: Bytes,
}

/// Candidate capture formats in preference order.
const FORMAT_CANDIDATES: [(&[u8; 4], PixelFormat); 2] =
    [(b"MJPG", PixelFormat::Mjpeg), (b"RGB3", PixelFormat::Rgb24)];

/// Open a video device and return a capture function bound to it.
///
/// Tries MJPEG first and falls back to raw RGB24, at the highest resolution
/// and frame rate the device reports for the chosen format. The returned
/// closure owns the camera; dropping it releases the device.
pub fn open_capture_fn(device: &str) -> Result<CaptureFn> {
    let mut last_err = anyhow!("no supported capture format on {device}");

    for (fourcc, pixel) in FORMAT_CANDIDATES {
        match start_camera(device, fourcc) {
            Ok((cam, (width, height))) => {
                log::info!(
                    "Using camera {device} ({width}x{height}, {})",
                    String::from_utf8_lossy(fourcc)
                );

                let capture = move || match cam.capture() {
                    Ok(frame) => Some(CapturedFrame {
                        pixel,
                        width,
                        height,
                        data: Bytes::copy_from_slice(&frame[..]),
                    }),
                    Err(err) => {
                        log::error!("Error capturing frame: {err}");
                        None
                    }
                };
                return Ok(Box::new(capture));
            }
            Err(err) => {
                log::debug!(
                    "Format {} not usable on {device}: {err:#}",
                    String::from_utf8_lossy(fourcc)
                );
                last_err = err;
            }
        }
    }

    Err(last_err)
}

/// Start streaming from the device with the given format.
fn start_camera(device: &str, format: &[u8]) -> Result<(Camera, (u32, u32))> {
    let mut cam = Camera::new(device).with_context(|| format!("opening {device}"))?;
    log_supported_formats(&cam);

    let resolution = get_max_resolution(&cam, format)?;
    let frame_rate = get_max_frame_rate(&cam, format, resolution)?;

    cam.start(&Config {
        interval: frame_rate,
        resolution,
        format,
        ..Default::default()
    })
    .with_context(|| format!("starting capture on {device}"))?;

    Ok((cam, resolution))
}

/// Get the maximum supported resolution for the given format.
fn get_max_resolution(cam: &Camera, format: &[u8]) -> Result<(u32, u32)> {
    let resolution_info = cam.resolutions(format)?;
    log::debug!("Found resolutions: {:?}", &resolution_info);
    match resolution_info {
        rscam::ResolutionInfo::Discretes(resolutions) => resolutions
            .iter()
            // Map to iterator over ((width, height), num_pixels)
            .map(|res| (res, res.0 * res.1))
            // Get the highest resolution in terms of number of pixels
            .max_by(|a, b| a.1.cmp(&b.1))
            // Extract width and height values
            .map(|res| *res.0),
        rscam::ResolutionInfo::Stepwise { max, .. } => Some(max),
    }
    .ok_or_else(|| anyhow!("no resolution found"))
}

/// Get the maximum supported frame rate for the given format and resolution.
fn get_max_frame_rate(cam: &Camera, format: &[u8], resolution: (u32, u32)) -> Result<(u32, u32)> {
    let interval_info = cam.intervals(format, resolution)?;
    log::debug!("Found frame rates: {:?}", &interval_info);
    match interval_info {
        rscam::IntervalInfo::Discretes(frame_rates) => frame_rates
            .iter()
            // Map discrete values to real frame rate
            .map(|(denominator, numerator)| ((denominator, numerator), numerator / denominator))
            // Get the highest frame rate
            .max_by(|a, b| a.1.cmp(&b.1))
            // Extract denominator and numerator
            .map(|((&d, &n), _)| (d, n)),
        rscam::IntervalInfo::Stepwise { max, .. } => Some(max),
    }
    .ok_or_else(|| anyhow!("no frame rate found"))
}

fn log_supported_formats(cam: &Camera) {
    let formats: Vec<_> = cam.formats().filter_map(|fmt| fmt.ok()).collect();
    log::debug!("Supported formats: {formats:?}");
}

/// JPEG bytes for the live view stream.
///
/// MJPEG frames pass through untouched; raw frames are encoded.
pub fn view_jpeg(frame: &CapturedFrame) -> Result<Bytes> {
    match frame.pixel {
        PixelFormat::Mjpeg => Ok(frame.data.clone()),
        PixelFormat::Rgb24 => Ok(Bytes::from(encode_jpeg(&rgb_image(frame)?)?)),
    }
}

/// Rasterize a frame at its native resolution and encode it as the JPEG
/// snapshot submitted for detection.
pub fn snapshot_jpeg(frame: &CapturedFrame) -> Result<Vec<u8>> {
    encode_jpeg(&rgb_image(frame)?)
}

fn rgb_image(frame: &CapturedFrame) -> Result<RgbImage> {
    match frame.pixel {
        PixelFormat::Mjpeg => Ok(image::load_from_memory(&frame.data)
            .context("decoding MJPEG frame")?
            .to_rgb8()),
        PixelFormat::Rgb24 => RgbImage::from_raw(frame.width, frame.height, frame.data.to_vec())
            .ok_or_else(|| {
                anyhow!(
                    "raw frame too short for {}x{}",
                    frame.width,
                    frame.height
                )
            }),
    }
}

fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, SNAPSHOT_JPEG_QUALITY);
    encoder.encode_image(image).context("encoding JPEG")?;
    Ok(buf)
}
