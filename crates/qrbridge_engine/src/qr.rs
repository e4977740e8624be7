use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
use qrbridge_core::DataUrl;
use qrcode::{Color, QrCode};

use crate::source::{FetchSettings, ImageLoader, ImageSource};
use crate::EngineError;

/// QR error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EcLevel {
    Low,
    #[default]
    Medium,
    Quartile,
    High,
}

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::Low => qrcode::EcLevel::L,
            EcLevel::Medium => qrcode::EcLevel::M,
            EcLevel::Quartile => qrcode::EcLevel::Q,
            EcLevel::High => qrcode::EcLevel::H,
        }
    }
}

/// Symbol construction and recognition.
#[async_trait::async_trait]
pub trait QrEngine: Send + Sync {
    async fn encode(&self, payload: &str, level: EcLevel) -> Result<DataUrl, EngineError>;

    /// Scan the image behind `source` (a URI) and return the raw decoded text.
    async fn decode(&self, source: &str) -> Result<String, EngineError>;
}

#[derive(Debug, Clone)]
pub struct QrRenderSettings {
    /// Pixels per module edge.
    pub module_px: u32,
    /// Light margin around the symbol, in modules.
    pub quiet_zone: u32,
}

impl Default for QrRenderSettings {
    fn default() -> Self {
        Self {
            module_px: 4,
            quiet_zone: 4,
        }
    }
}

/// Default engine: `qrcode` for construction, `rqrr` for recognition.
#[derive(Debug, Clone, Default)]
pub struct StandardQrEngine {
    render: QrRenderSettings,
    loader: ImageLoader,
}

impl StandardQrEngine {
    pub fn new(render: QrRenderSettings, fetch: FetchSettings) -> Self {
        Self {
            render,
            loader: ImageLoader::new(fetch),
        }
    }
}

#[async_trait::async_trait]
impl QrEngine for StandardQrEngine {
    async fn encode(&self, payload: &str, level: EcLevel) -> Result<DataUrl, EngineError> {
        if payload.is_empty() {
            return Err(EngineError::EmptyPayload);
        }
        let payload = payload.to_owned();
        let render = self.render.clone();
        run_blocking(move || {
            let code = QrCode::with_error_correction_level(payload.as_bytes(), level.into())
                .map_err(|err| EngineError::Encode(err.to_string()))?;
            let png = render_png(&code, &render)?;
            Ok(DataUrl::from_png_base64(&STANDARD.encode(png)))
        })
        .await
    }

    async fn decode(&self, source: &str) -> Result<String, EngineError> {
        let source = ImageSource::parse(source)?;
        let bytes = self.loader.load(&source).await?;
        run_blocking(move || scan(bytes)).await
    }
}

/// Symbol work is CPU-bound; keep it off the event-loop threads.
async fn run_blocking<T, F>(work: F) -> Result<T, EngineError>
where
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| EngineError::Worker(err.to_string()))?
}

fn render_png(code: &QrCode, settings: &QrRenderSettings) -> Result<Vec<u8>, EngineError> {
    let modules = code.width() as u32;
    let scale = settings.module_px.max(1);
    let quiet = settings.quiet_zone;
    let side = (modules + 2 * quiet) * scale;
    let colors = code.to_colors();
    let symbol = quiet..quiet + modules;

    let bitmap = GrayImage::from_fn(side, side, |x, y| {
        let (mx, my) = (x / scale, y / scale);
        let dark = symbol.contains(&mx)
            && symbol.contains(&my)
            && colors[((my - quiet) * modules + (mx - quiet)) as usize] == Color::Dark;
        if dark {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    });

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(bitmap)
        .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
        .map_err(|err| EngineError::Render(err.to_string()))?;
    Ok(png)
}

fn scan(bytes: Bytes) -> Result<String, EngineError> {
    let luma = image::load_from_memory(&bytes)
        .map_err(|err| EngineError::InvalidImage(err.to_string()))?
        .to_luma8();
    let (width, height) = luma.dimensions();
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            luma.get_pixel(x as u32, y as u32)[0]
        });

    let grids = prepared.detect_grids();
    if grids.is_empty() {
        return Err(EngineError::NoSymbol);
    }
    let mut last_error = String::new();
    for grid in grids {
        match grid.decode() {
            Ok((_meta, text)) => return Ok(text),
            Err(err) => last_error = err.to_string(),
        }
    }
    Err(EngineError::Decode(last_error))
}

#[cfg(test)]
mod tests {
    use super::{render_png, scan, QrRenderSettings};
    use bytes::Bytes;
    use qrcode::QrCode;

    #[test]
    fn rendered_symbol_has_quiet_zone_and_scale() {
        let code = QrCode::new(b"abc").unwrap();
        let settings = QrRenderSettings {
            module_px: 3,
            quiet_zone: 2,
        };
        let png = render_png(&code, &settings).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_luma8();
        let expected = (code.width() as u32 + 4) * 3;
        assert_eq!(img.dimensions(), (expected, expected));
        // Corner lies in the quiet zone, the finder pattern starts right after it.
        assert_eq!(img.get_pixel(0, 0)[0], 255);
        assert_eq!(img.get_pixel(6, 6)[0], 0);
    }

    #[test]
    fn scan_reads_back_rendered_symbol() {
        let code = QrCode::new("scan me".as_bytes()).unwrap();
        let png = render_png(&code, &QrRenderSettings::default()).unwrap();
        assert_eq!(scan(Bytes::from(png)).unwrap(), "scan me");
    }
}
