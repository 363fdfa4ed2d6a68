//! Mockup image loading with a prioritized fallback chain.
//!
//! Sources are tried in order (direct URL, proxy, alternate proxy,
//! generated placeholder), each behind the same async interface. The
//! loader itself never fails: a design session must always get a
//! backdrop, degraded or not.

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use thiserror::Error;

/// Placeholder dimensions when everything upstream fails.
const PLACEHOLDER_SIZE: u32 = 512;
/// Checker cell size in the placeholder graphic.
const PLACEHOLDER_CELL: u32 = 32;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("fetch returned status {0}")]
    Status(u16),

    #[error("placeholder encode error: {0}")]
    Encode(String),
}

/// One way of obtaining image bytes for a URL.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Short human-readable name, recorded on the loaded result.
    fn describe(&self) -> String;

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError>;
}

/// Plain GET of the URL itself.
pub struct DirectSource {
    client: reqwest::Client,
}

impl DirectSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for DirectSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for DirectSource {
    fn describe(&self) -> String {
        "direct".to_string()
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AssetError::Status(response.status().as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// GET through a CORS/image proxy that takes the target URL as a
/// suffix, e.g. `https://proxy.example/fetch?url=`.
pub struct ProxySource {
    client: reqwest::Client,
    base: String,
}

impl ProxySource {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.into(),
        }
    }
}

#[async_trait]
impl ImageSource for ProxySource {
    fn describe(&self) -> String {
        format!("proxy:{}", self.base)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let proxied = format!("{}{}", self.base, url);
        let response = self.client.get(&proxied).send().await?;
        if !response.status().is_success() {
            return Err(AssetError::Status(response.status().as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Terminal source: synthesises a checkerboard PNG in-process.
pub struct PlaceholderSource;

#[async_trait]
impl ImageSource for PlaceholderSource {
    fn describe(&self) -> String {
        "placeholder".to_string()
    }

    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, AssetError> {
        placeholder_png(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE)
    }
}

/// Light/dark grey checkerboard, the universal "asset missing" look.
fn placeholder_png(width: u32, height: u32) -> Result<Vec<u8>, AssetError> {
    let mut img = RgbaImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let even = (x / PLACEHOLDER_CELL + y / PLACEHOLDER_CELL) % 2 == 0;
        *pixel = if even {
            Rgba([220, 220, 220, 255])
        } else {
            Rgba([180, 180, 180, 255])
        };
    }
    let mut png = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|err| AssetError::Encode(err.to_string()))?;
    Ok(png)
}

/// Result of a mockup load. `degraded` is set whenever the bytes did
/// not come from the first source, so the UI can show an indicator.
#[derive(Debug, Clone)]
pub struct LoadedMockup {
    pub bytes: Vec<u8>,
    /// Which source produced the bytes.
    pub origin: String,
    pub degraded: bool,
}

/// Ordered chain of image sources.
pub struct MockupLoader {
    sources: Vec<Box<dyn ImageSource>>,
}

impl MockupLoader {
    /// Direct fetch with a placeholder fallback.
    pub fn new() -> Self {
        Self::from_sources(vec![
            Box::new(DirectSource::new()),
            Box::new(PlaceholderSource),
        ])
    }

    /// Direct fetch, then each proxy in order, then the placeholder.
    pub fn with_proxies(proxies: impl IntoIterator<Item = String>) -> Self {
        let mut sources: Vec<Box<dyn ImageSource>> = vec![Box::new(DirectSource::new())];
        for proxy in proxies {
            sources.push(Box::new(ProxySource::new(proxy)));
        }
        sources.push(Box::new(PlaceholderSource));
        Self::from_sources(sources)
    }

    pub fn from_sources(sources: Vec<Box<dyn ImageSource>>) -> Self {
        Self { sources }
    }

    /// Try each source in order and return the first success. Total:
    /// the placeholder source cannot fail in practice, and even an
    /// empty chain yields an empty (degraded) result rather than an
    /// error.
    pub async fn load(&self, url: &str) -> LoadedMockup {
        for (index, source) in self.sources.iter().enumerate() {
            match source.fetch(url).await {
                Ok(bytes) => {
                    if index > 0 {
                        log::info!(
                            "mockup for {url} loaded via fallback source {}",
                            source.describe()
                        );
                    }
                    return LoadedMockup {
                        bytes,
                        origin: source.describe(),
                        degraded: index > 0,
                    };
                }
                Err(err) => {
                    log::warn!("mockup source {} failed for {url}: {err}", source.describe());
                }
            }
        }
        log::error!("every mockup source failed for {url}");
        LoadedMockup {
            bytes: Vec::new(),
            origin: "none".to_string(),
            degraded: true,
        }
    }
}

impl Default for MockupLoader {
    fn default() -> Self {
        Self::new()
    }
}
