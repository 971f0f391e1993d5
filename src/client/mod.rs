use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;

use crate::config;
use crate::intake::CandidateImage;
use crate::workflow::StyleParameters;

const PROCESS_ROUTE: &str = "/process";
const IMAGE_FIELD: &str = "image";
const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("failed to reach the sticker service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sticker service rejected the request with status {status}")]
    ServerRejected { status: StatusCode },
    #[error("sticker service returned a non-image response (content type {content_type:?})")]
    MalformedResponse { content_type: Option<String> },
    #[error("processing worker exited without posting a result")]
    Interrupted,
}

pub type ProcessingResult<T> = std::result::Result<T, ProcessingError>;

/// Seam between the workflow and the external sticker service. One call, one
/// request; retry policy belongs to the user, never to the backend.
pub trait ProcessorBackend {
    fn process(&self, image: &CandidateImage, style: &StyleParameters)
        -> ProcessingResult<Vec<u8>>;
}

/// Talks to the sticker service over one multipart POST per invocation.
#[derive(Debug, Clone)]
pub struct HttpProcessor {
    http: Client,
    endpoint: String,
}

impl HttpProcessor {
    pub fn new(service_url: &str, timeout: Duration) -> ProcessingResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: process_endpoint(service_url),
        })
    }

    /// Builds a processor from `config.json`, falling back to the bundled
    /// defaults when no configuration exists.
    pub fn from_config() -> ProcessingResult<Self> {
        let config = config::load_app_config();
        Self::new(
            config.service_url(),
            Duration::from_secs(config.request_timeout_secs()),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ProcessorBackend for HttpProcessor {
    fn process(
        &self,
        image: &CandidateImage,
        style: &StyleParameters,
    ) -> ProcessingResult<Vec<u8>> {
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.mime_type())?;

        let mut form = Form::new().part(IMAGE_FIELD, part);
        for (name, value) in wire_fields(style) {
            form = form.text(name, value);
        }

        tracing::debug!(
            endpoint = %self.endpoint,
            file_name = image.file_name(),
            size = image.size(),
            "sending sticker processing request"
        );

        let response = self.http.post(&self.endpoint).multipart(form).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProcessingError::ServerRejected { status });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        // The service signals processing failures as non-image bodies even on
        // success statuses; the payload itself stays opaque.
        if !content_type
            .as_deref()
            .is_some_and(|value| value.starts_with(IMAGE_CONTENT_TYPE_PREFIX))
        {
            return Err(ProcessingError::MalformedResponse { content_type });
        }

        let bytes = response.bytes()?;
        if bytes.is_empty() {
            return Err(ProcessingError::MalformedResponse { content_type });
        }

        Ok(bytes.to_vec())
    }
}

fn process_endpoint(service_url: &str) -> String {
    format!("{}{}", service_url.trim_end_matches('/'), PROCESS_ROUTE)
}

/// Style fields of the wire contract, in declaration order. Decimal
/// formatting matters: integers render without a fractional part and the
/// opacity keeps its shortest decimal form.
fn wire_fields(style: &StyleParameters) -> [(&'static str, String); 8] {
    let border = style.border_color();
    let background = style.background_color();
    [
        ("border_thickness", style.border_thickness().to_string()),
        ("border_r", border.r.to_string()),
        ("border_g", border.g.to_string()),
        ("border_b", border.b.to_string()),
        ("border_a", border.a.to_string()),
        ("bg_r", background.r.to_string()),
        ("bg_g", background.g.to_string()),
        ("bg_b", background.b.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{Rgb, Rgba};

    #[test]
    fn default_style_encodes_the_documented_field_values() {
        let fields = wire_fields(&StyleParameters::default());
        assert_eq!(
            fields,
            [
                ("border_thickness", "5".to_string()),
                ("border_r", "255".to_string()),
                ("border_g", "255".to_string()),
                ("border_b", "255".to_string()),
                ("border_a", "1".to_string()),
                ("bg_r", "255".to_string()),
                ("bg_g", "255".to_string()),
                ("bg_b", "255".to_string()),
            ]
        );
    }

    #[test]
    fn fractional_opacity_keeps_its_decimal_form() {
        let mut style = StyleParameters::default();
        style.set_border_color(Rgba::new(10, 20, 30, 0.5));
        let fields = wire_fields(&style);
        assert_eq!(fields[4], ("border_a", "0.5".to_string()));

        style.set_border_color(Rgba::new(10, 20, 30, 0.25));
        let fields = wire_fields(&style);
        assert_eq!(fields[4], ("border_a", "0.25".to_string()));
    }

    #[test]
    fn custom_colors_encode_as_decimal_strings() {
        let mut style = StyleParameters::default();
        style.set_border_thickness(50);
        style.set_border_color(Rgba::new(1, 2, 3, 1.0));
        style.set_background_color(Rgb::new(200, 100, 0));

        let fields = wire_fields(&style);
        assert_eq!(fields[0], ("border_thickness", "50".to_string()));
        assert_eq!(fields[1], ("border_r", "1".to_string()));
        assert_eq!(fields[2], ("border_g", "2".to_string()));
        assert_eq!(fields[3], ("border_b", "3".to_string()));
        assert_eq!(fields[5], ("bg_r", "200".to_string()));
        assert_eq!(fields[6], ("bg_g", "100".to_string()));
        assert_eq!(fields[7], ("bg_b", "0".to_string()));
    }

    #[test]
    fn endpoint_join_tolerates_trailing_slashes() {
        assert_eq!(
            process_endpoint("http://localhost:8000"),
            "http://localhost:8000/process"
        );
        assert_eq!(
            process_endpoint("http://localhost:8000/"),
            "http://localhost:8000/process"
        );
    }
}
