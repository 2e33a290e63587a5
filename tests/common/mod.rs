//! Shared fixtures for integration tests
//!
//! [`ScriptedSource`] is an in-memory [`DataSource`] whose identity lookups,
//! first pages and continuation pages are set up per test. It counts every
//! call so tests can assert on retry behaviour and laziness.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use meridian::adapters::upstream::DataSource;
use meridian::core::fetch::{FetchContext, TimeWindow, BENE_ID_SYSTEM};
use meridian::domain::{
    BatchId, BeneficiaryId, Bundle, JobId, MeridianError, PatientId, Resource, ResourceType,
    Result, UpstreamError,
};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const SCRIPTED_SCHEME: &str = "scripted:";

/// Fixed transaction time shared by the tests
pub fn transaction_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn context(resource_type: ResourceType) -> FetchContext {
    FetchContext::new(
        JobId::new(),
        BatchId::new(),
        resource_type,
        None,
        transaction_time(),
    )
    .unwrap()
}

pub fn patient_id(raw: &str) -> PatientId {
    PatientId::new(raw).unwrap()
}

/// `count` records of `resource_type` with ids `<prefix>-<n>`
pub fn records(resource_type: ResourceType, prefix: &str, count: usize) -> Vec<Resource> {
    (0..count)
        .map(|n| {
            Resource::new(json!({
                "resourceType": resource_type.as_str(),
                "id": format!("{prefix}-{n}"),
            }))
        })
        .collect()
}

/// A searchset page stamped with the transaction time
pub fn page(resources: Vec<Resource>) -> Bundle {
    Bundle::searchset(resources).with_last_updated(transaction_time())
}

/// Identity bundle holding one Patient that carries `bene_id`
pub fn identity_bundle(bene_id: &str) -> Bundle {
    Bundle::searchset(vec![Resource::new(json!({
        "resourceType": "Patient",
        "id": bene_id,
        "identifier": [
            {"system": "http://hl7.org/fhir/sid/us-mbi", "value": "ignored"},
            {"system": BENE_ID_SYSTEM, "value": bene_id}
        ]
    }))])
}

/// Scripted in-memory upstream source
#[derive(Default)]
pub struct ScriptedSource {
    identities: HashMap<String, Bundle>,
    pages: HashMap<(ResourceType, String), Vec<Bundle>>,
    failures: Mutex<HashMap<ResourceType, VecDeque<MeridianError>>>,
    always_fail: HashMap<ResourceType, UpstreamError>,
    windows: Mutex<Vec<TimeWindow>>,
    identity_calls: AtomicUsize,
    first_page_calls: AtomicUsize,
    next_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `mbi` as resolving to `bene_id`
    pub fn with_patient(self, mbi: &str, bene_id: &str) -> Self {
        self.with_identity(mbi, identity_bundle(bene_id))
    }

    /// Registers a raw identity lookup response
    pub fn with_identity(mut self, mbi: &str, bundle: Bundle) -> Self {
        self.identities.insert(mbi.to_string(), bundle);
        self
    }

    /// Registers the pages of one search; `next` links are filled in
    pub fn with_pages(mut self, resource_type: ResourceType, bene_id: &str, pages: Vec<Bundle>) -> Self {
        let last = pages.len().saturating_sub(1);
        let linked = pages
            .into_iter()
            .enumerate()
            .map(|(index, page)| {
                if index < last {
                    page.with_next_link(format!(
                        "{SCRIPTED_SCHEME}{resource_type}/{bene_id}/{}",
                        index + 1
                    ))
                } else {
                    page
                }
            })
            .collect();
        self.pages.insert((resource_type, bene_id.to_string()), linked);
        self
    }

    /// The next first-page requests for `resource_type` fail with `errors`, in order
    pub fn failing_first(self, resource_type: ResourceType, errors: Vec<MeridianError>) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(resource_type, errors.into_iter().collect());
        self
    }

    /// Every first-page request for `resource_type` fails with `error`
    pub fn always_failing(mut self, resource_type: ResourceType, error: UpstreamError) -> Self {
        self.always_fail.insert(resource_type, error);
        self
    }

    pub fn identity_calls(&self) -> usize {
        self.identity_calls.load(Ordering::SeqCst)
    }

    pub fn first_page_calls(&self) -> usize {
        self.first_page_calls.load(Ordering::SeqCst)
    }

    pub fn next_calls(&self) -> usize {
        self.next_calls.load(Ordering::SeqCst)
    }

    /// Windows passed to first-page requests, in call order
    pub fn windows(&self) -> Vec<TimeWindow> {
        self.windows.lock().unwrap().clone()
    }

    fn first_page(
        &self,
        resource_type: ResourceType,
        bene_id: &BeneficiaryId,
        window: &TimeWindow,
    ) -> Result<Bundle> {
        self.first_page_calls.fetch_add(1, Ordering::SeqCst);
        self.windows.lock().unwrap().push(*window);

        if let Some(error) = self.always_fail.get(&resource_type) {
            return Err(error.clone().into());
        }
        let scripted = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&resource_type)
            .and_then(VecDeque::pop_front);
        if let Some(error) = scripted {
            return Err(error);
        }

        self.page_at(resource_type, bene_id.as_str(), 0)
    }

    fn page_at(&self, resource_type: ResourceType, bene_id: &str, index: usize) -> Result<Bundle> {
        self.pages
            .get(&(resource_type, bene_id.to_string()))
            .and_then(|pages| pages.get(index))
            .cloned()
            .ok_or_else(|| {
                UpstreamError::NotFound(format!("{resource_type}/{bene_id}/{index}")).into()
            })
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    async fn request_patient_by_identifier(&self, patient_id: &PatientId) -> Result<Bundle> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        self.identities
            .get(patient_id.as_str())
            .cloned()
            .ok_or_else(|| UpstreamError::NotFound(format!("Patient {patient_id}")).into())
    }

    async fn request_patients(&self, bene_id: &BeneficiaryId, window: &TimeWindow) -> Result<Bundle> {
        self.first_page(ResourceType::Patient, bene_id, window)
    }

    async fn request_eobs(&self, bene_id: &BeneficiaryId, window: &TimeWindow) -> Result<Bundle> {
        self.first_page(ResourceType::ExplanationOfBenefit, bene_id, window)
    }

    async fn request_coverage(&self, bene_id: &BeneficiaryId, window: &TimeWindow) -> Result<Bundle> {
        self.first_page(ResourceType::Coverage, bene_id, window)
    }

    async fn request_next_bundle(&self, bundle: &Bundle) -> Result<Bundle> {
        self.next_calls.fetch_add(1, Ordering::SeqCst);
        let link = bundle
            .next_link()
            .and_then(|l| l.strip_prefix(SCRIPTED_SCHEME))
            .ok_or_else(|| UpstreamError::InvalidResponse("no next link".to_string()))?;

        let mut parts = link.splitn(3, '/');
        let (Some(resource_type), Some(bene_id), Some(index)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(UpstreamError::InvalidResponse(format!("bad link {link}")).into());
        };
        let resource_type: ResourceType = resource_type
            .parse()
            .map_err(|e: String| UpstreamError::InvalidResponse(e))?;
        let index: usize = index
            .parse()
            .map_err(|_| UpstreamError::InvalidResponse(format!("bad index in {link}")))?;

        self.page_at(resource_type, bene_id, index)
    }

    fn base_url(&self) -> &str {
        "scripted://memory"
    }
}
