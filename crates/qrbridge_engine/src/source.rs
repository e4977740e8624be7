use std::path::PathBuf;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use futures_util::StreamExt;
use url::Url;

use crate::EngineError;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Where the bytes of an image to decode come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Inline `data:` URL, already decoded.
    Inline(Bytes),
    File(PathBuf),
    Http(Url),
}

impl ImageSource {
    pub fn parse(uri: &str) -> Result<Self, EngineError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(EngineError::UnsupportedSource("empty image source".into()));
        }
        if let Some(rest) = strip_prefix_ignore_case(uri, "data:") {
            return parse_data_url(rest).map(ImageSource::Inline);
        }

        let url = Url::parse(uri).map_err(|err| EngineError::UnsupportedSource(err.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(ImageSource::Http(url)),
            "file" => url
                .to_file_path()
                .map(ImageSource::File)
                .map_err(|_| EngineError::UnsupportedSource(uri.to_string())),
            other => Err(EngineError::UnsupportedSource(format!("scheme {other}"))),
        }
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// Parse the part of a data URL after `data:`: `[<mediatype>][;base64],<data>`.
fn parse_data_url(rest: &str) -> Result<Bytes, EngineError> {
    let (meta, data) = rest
        .split_once(',')
        .ok_or_else(|| EngineError::UnsupportedSource("malformed data url".into()))?;
    let is_base64 = meta
        .rsplit(';')
        .next()
        .is_some_and(|flag| flag.eq_ignore_ascii_case("base64"));
    if is_base64 {
        let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD
            .decode(cleaned)
            .map(Bytes::from)
            .map_err(|err| EngineError::InvalidImage(err.to_string()))
    } else {
        Ok(Bytes::copy_from_slice(data.as_bytes()))
    }
}

/// Loads image bytes for the decoder, bounded by [`FetchSettings`].
#[derive(Debug, Clone, Default)]
pub struct ImageLoader {
    settings: FetchSettings,
}

impl ImageLoader {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    pub async fn load(&self, source: &ImageSource) -> Result<Bytes, EngineError> {
        let bytes = match source {
            ImageSource::Inline(bytes) => bytes.clone(),
            ImageSource::File(path) => tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|err| EngineError::Load(format!("{}: {err}", path.display())))?,
            ImageSource::Http(url) => return self.fetch(url.clone()).await,
        };
        self.check_size(bytes.len() as u64)?;
        Ok(bytes)
    }

    fn check_size(&self, actual: u64) -> Result<(), EngineError> {
        if actual > self.settings.max_bytes {
            return Err(EngineError::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            });
        }
        Ok(())
    }

    fn build_client(&self) -> Result<reqwest::Client, EngineError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| EngineError::Load(err.to_string()))
    }

    async fn fetch(&self, url: Url) -> Result<Bytes, EngineError> {
        let client = self.build_client()?;
        let response = client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::HttpStatus(status.as_u16()));
        }
        if let Some(content_len) = response.content_length() {
            self.check_size(content_len)?;
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            self.check_size(bytes.len() as u64 + chunk.len() as u64)?;
            bytes.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(bytes))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> EngineError {
    if err.is_timeout() {
        return EngineError::Load(format!("timeout: {err}"));
    }
    EngineError::Load(err.to_string())
}
