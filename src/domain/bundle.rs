//! FHIR Bundle domain model
//!
//! A [`Bundle`] is one page of an upstream search: an ordered list of entries,
//! optional pagination links, and the snapshot time the page represents.

use super::errors::UpstreamError;
use super::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Link relation naming the following page of a search
pub const LINK_NEXT: &str = "next";

/// One page of a FHIR search result
///
/// # Examples
///
/// ```
/// use meridian::domain::bundle::Bundle;
/// use meridian::domain::Resource;
/// use serde_json::json;
///
/// let bundle = Bundle::searchset(vec![Resource::new(json!({"resourceType": "Coverage"}))])
///     .with_next_link("https://fhir.example.com/Coverage?page=2");
///
/// assert_eq!(bundle.next_link(), Some("https://fhir.example.com/Coverage?page=2"));
/// assert_eq!(bundle.resources().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Always `"Bundle"`
    #[serde(default = "default_bundle_resource_type")]
    pub resource_type: String,

    /// Bundle type (searchset, collection, ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub bundle_type: Option<String>,

    /// Bundle metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BundleMeta>,

    /// Total number of matches across all pages, when the server reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    /// Pagination and self links
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<BundleLink>,

    /// Entries in page order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

/// Bundle `meta` element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMeta {
    /// Snapshot time the page represents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Bundle `link` element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

/// Bundle `entry` element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
}

/// `resourceType` every search page must declare
pub const BUNDLE_RESOURCE_TYPE: &str = "Bundle";

fn default_bundle_resource_type() -> String {
    BUNDLE_RESOURCE_TYPE.to_string()
}

impl Bundle {
    /// Creates a searchset bundle holding the given resources
    pub fn searchset(resources: Vec<Resource>) -> Self {
        let total = resources.len() as u64;
        Self {
            resource_type: default_bundle_resource_type(),
            bundle_type: Some("searchset".to_string()),
            meta: None,
            total: Some(total),
            link: Vec::new(),
            entry: resources
                .into_iter()
                .map(|resource| BundleEntry {
                    full_url: None,
                    resource: Some(resource),
                })
                .collect(),
        }
    }

    /// Sets the `next` link
    pub fn with_next_link(mut self, url: impl Into<String>) -> Self {
        self.link.retain(|l| l.relation != LINK_NEXT);
        self.link.push(BundleLink {
            relation: LINK_NEXT.to_string(),
            url: url.into(),
        });
        self
    }

    /// Sets `meta.lastUpdated`
    pub fn with_last_updated(mut self, last_updated: DateTime<Utc>) -> Self {
        self.meta = Some(BundleMeta {
            last_updated: Some(last_updated),
        });
        self
    }

    /// Overrides the reported total
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// URL of the link with the given relation
    pub fn link(&self, relation: &str) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.relation == relation)
            .map(|l| l.url.as_str())
    }

    /// URL of the following page, if any
    pub fn next_link(&self) -> Option<&str> {
        self.link(LINK_NEXT)
    }

    /// Snapshot time the page claims to represent
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.meta.as_ref().and_then(|m| m.last_updated)
    }

    /// Resources in entry order; entries without a resource are skipped
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().filter_map(|e| e.resource.as_ref())
    }

    /// Rejects payloads that parsed but declared another resource type,
    /// such as an OperationOutcome returned with a success status
    pub fn ensure_bundle(self, what: &str) -> Result<Self, UpstreamError> {
        if self.resource_type == BUNDLE_RESOURCE_TYPE {
            Ok(self)
        } else {
            Err(UpstreamError::InvalidResponse(format!(
                "{what} response is a {}, not a Bundle",
                self.resource_type
            )))
        }
    }

    /// Consume the bundle, yielding its entries
    pub fn into_entries(self) -> Vec<BundleEntry> {
        self.entry
    }
}
