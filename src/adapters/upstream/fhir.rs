//! FHIR REST data source
//!
//! Talks to a FHIR server over HTTP(S) with `reqwest`. First-page searches are
//! built from the base URL; later pages follow the absolute `next` link the
//! server returned.

use super::source::DataSource;
use crate::config::{AuthType, UpstreamConfig};
use crate::core::fetch::TimeWindow;
use crate::domain::{BeneficiaryId, Bundle, MeridianError, PatientId, Result, UpstreamError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

/// Identifier system the external patient identifier is searched under
pub const MBI_SYSTEM: &str = "http://hl7.org/fhir/sid/us-mbi";

const FHIR_JSON: &str = "application/fhir+json";

/// [`DataSource`] backed by a FHIR REST server
pub struct FhirDataSource {
    base_url: String,
    client: Client,
    auth_header: Option<String>,
    page_size: Option<u32>,
}

impl FhirDataSource {
    /// Builds the HTTP client from upstream configuration
    ///
    /// # Errors
    ///
    /// Returns [`MeridianError::Configuration`] if the base URL is not a
    /// valid URL or the HTTP client cannot be built.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            MeridianError::Configuration(format!("Invalid upstream base_url '{base_url}': {e}"))
        })?;

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            tracing::warn!(base_url = %base_url, "TLS certificate verification disabled");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            MeridianError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            base_url,
            client,
            auth_header: auth_header_value(config),
            page_size: config.page_size,
        })
    }

    fn search_url(&self, resource_type: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, resource_type))
            .map_err(|e| MeridianError::Internal(format!("Failed to build search URL: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            if let Some(count) = self.page_size {
                query.append_pair("_count", &count.to_string());
            }
        }
        Ok(url)
    }

    async fn search(
        &self,
        resource_type: &str,
        patient_param: &str,
        bene_id: &BeneficiaryId,
        window: &TimeWindow,
    ) -> Result<Bundle> {
        let mut params = vec![(patient_param, bene_id.as_str().to_string())];
        params.extend(window.query_params());
        let url = self.search_url(resource_type, &params)?;
        self.get_bundle(url.as_str(), resource_type).await
    }

    async fn get_bundle(&self, url: &str, what: &str) -> Result<Bundle> {
        tracing::debug!(url = %url, "Requesting bundle");

        let mut request = self.client.get(url).header("Accept", FHIR_JSON);
        if let Some(auth) = &self.auth_header {
            request = request.header("Authorization", auth);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout(e.to_string())
            } else {
                UpstreamError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "Failed to read error response body");
                    String::new()
                }
            };
            return Err(status_error(status, what, body).into());
        }

        let bundle = response.json::<Bundle>().await.map_err(|e| {
            UpstreamError::InvalidResponse(format!("{what} bundle could not be parsed: {e}"))
        })?;
        Ok(bundle.ensure_bundle(what)?)
    }
}

fn status_error(status: StatusCode, what: &str, body: String) -> UpstreamError {
    match status {
        StatusCode::NOT_FOUND => UpstreamError::NotFound(format!("{what}: {body}")),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            UpstreamError::AuthenticationFailed(format!("{what}: HTTP {status}"))
        }
        _ => UpstreamError::Http {
            status: status.as_u16(),
            message: body,
        },
    }
}

fn auth_header_value(config: &UpstreamConfig) -> Option<String> {
    match config.auth_type {
        AuthType::None => None,
        AuthType::Basic => {
            let username = config.username.as_deref().unwrap_or_default();
            let password = config
                .password
                .as_ref()
                .map(|p| p.expose_secret().as_str().to_string())
                .unwrap_or_default();
            let encoded = general_purpose::STANDARD.encode(format!("{username}:{password}"));
            Some(format!("Basic {encoded}"))
        }
        AuthType::Bearer => config
            .token
            .as_ref()
            .map(|t| format!("Bearer {}", t.expose_secret().as_str())),
    }
}

#[async_trait]
impl DataSource for FhirDataSource {
    async fn request_patient_by_identifier(&self, patient_id: &PatientId) -> Result<Bundle> {
        let url = self.search_url(
            "Patient",
            &[("identifier", format!("{MBI_SYSTEM}|{patient_id}"))],
        )?;
        self.get_bundle(url.as_str(), "Patient").await
    }

    async fn request_patients(
        &self,
        bene_id: &BeneficiaryId,
        window: &TimeWindow,
    ) -> Result<Bundle> {
        self.search("Patient", "_id", bene_id, window).await
    }

    async fn request_eobs(&self, bene_id: &BeneficiaryId, window: &TimeWindow) -> Result<Bundle> {
        self.search("ExplanationOfBenefit", "patient", bene_id, window)
            .await
    }

    async fn request_coverage(
        &self,
        bene_id: &BeneficiaryId,
        window: &TimeWindow,
    ) -> Result<Bundle> {
        self.search("Coverage", "beneficiary", bene_id, window).await
    }

    async fn request_next_bundle(&self, bundle: &Bundle) -> Result<Bundle> {
        let next = bundle.next_link().ok_or_else(|| {
            UpstreamError::InvalidResponse("Bundle has no next link".to_string())
        })?;
        self.get_bundle(next, "next page").await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
