//! Client for an external instance segmentation service.
//!
//! The service runs a Mask R-CNN style model and reads images from a
//! filesystem shared with the worker. Protocol:
//!
//! ```text
//! POST {base}/v1/segment
//! {"images": ["/data/samples/CAM_FRONT/a.jpg", ...]}
//!
//! 200 OK
//! {"results": [{"instances": [{"label": "car", "score": 0.97, "mask_png": "<base64>"}]}]}
//! ```
//!
//! One result is returned per image, in request order. Each `mask_png` is a
//! base64-encoded single-instance PNG; non-zero pixels belong to the
//! instance.

mod error;

pub use error::{MlClientError, MlClientResult};

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rdepth_media::{InstanceMask, MaskError, MaskResult, SegmentationModel};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP segmentation client.
#[derive(Clone)]
pub struct SegmentationClient {
    base_url: Url,
    client: Client,
}

#[derive(Debug, Serialize)]
struct SegmentRequest<'a> {
    images: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SegmentResponse {
    results: Vec<ImageResult>,
}

#[derive(Debug, Deserialize)]
struct ImageResult {
    #[serde(default)]
    instances: Vec<InstancePayload>,
}

#[derive(Debug, Deserialize)]
struct InstancePayload {
    label: String,
    score: f32,
    mask_png: String,
}

impl SegmentationClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> MlClientResult<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check that the service answers its health endpoint.
    pub async fn health(&self) -> MlClientResult<bool> {
        let url = self.base_url.join("health")?;
        let response = self.client.get(url).send().await?;
        Ok(response.status().is_success())
    }

    /// Segment a batch of images.
    pub async fn segment_images(&self, images: &[PathBuf]) -> MlClientResult<Vec<Vec<InstanceMask>>> {
        let url = self.base_url.join("v1/segment")?;
        let names: Vec<String> = images
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let request = SegmentRequest {
            images: names.iter().map(String::as_str).collect(),
        };

        debug!(url = %url, images = images.len(), "Sending segmentation request");

        let response = self.client.post(url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MlClientError::Status { status, body });
        }

        let parsed: SegmentResponse = response
            .json()
            .await
            .map_err(|e| MlClientError::invalid_response(format!("Failed to parse response: {}", e)))?;

        if parsed.results.len() != images.len() {
            return Err(MlClientError::invalid_response(format!(
                "expected {} results, got {}",
                images.len(),
                parsed.results.len()
            )));
        }

        parsed
            .results
            .into_iter()
            .map(|result| {
                result
                    .instances
                    .into_iter()
                    .enumerate()
                    .map(|(index, payload)| decode_instance(index, payload))
                    .collect::<MlClientResult<Vec<_>>>()
            })
            .collect()
    }
}

fn decode_instance(index: usize, payload: InstancePayload) -> MlClientResult<InstanceMask> {
    let bytes = STANDARD
        .decode(payload.mask_png.as_bytes())
        .map_err(|e| MlClientError::invalid_mask(index, e.to_string()))?;
    let mask = image::load_from_memory(&bytes)
        .map_err(|e| MlClientError::invalid_mask(index, e.to_string()))?
        .to_luma8();

    Ok(InstanceMask {
        label: payload.label,
        score: payload.score,
        mask,
    })
}

#[async_trait]
impl SegmentationModel for SegmentationClient {
    async fn segment(&self, images: &[PathBuf]) -> MaskResult<Vec<Vec<InstanceMask>>> {
        self.segment_images(images).await.map_err(|e| {
            warn!(error = %e, images = images.len(), "Segmentation request failed");
            if e.is_unavailable() {
                MaskError::model_unavailable(e.to_string())
            } else {
                MaskError::internal(format!("Segmentation service error: {}", e))
            }
        })
    }

    fn name(&self) -> &'static str {
        "segmentation_service"
    }
}
