//! Page walking with freshness and category checks
//!
//! Pages are visited strictly in link order. Each page is checked as a
//! whole before any of its records are released, so a bad page never
//! contributes partial output.

use super::context::FetchContext;
use crate::adapters::upstream::DataSource;
use crate::domain::{Bundle, MeridianError, Resource, ResourceType, Result};
use chrono::{DateTime, Utc};

/// Fails with [`MeridianError::DataRegression`] when `page` claims a snapshot
/// older than `transaction_time`
///
/// A page without `meta.lastUpdated` is accepted.
pub fn check_freshness(page: &Bundle, transaction_time: DateTime<Utc>) -> Result<()> {
    match page.last_updated() {
        Some(bundle_time) if bundle_time < transaction_time => {
            Err(MeridianError::DataRegression {
                bundle_time,
                transaction_time,
            })
        }
        _ => Ok(()),
    }
}

/// Fails with [`MeridianError::Format`] unless `resource` is of `expected` type
pub fn check_category(resource: &Resource, expected: ResourceType) -> Result<()> {
    let got = resource.resource_type_name().unwrap_or("<missing>");
    if got != expected.as_str() {
        return Err(MeridianError::Format(format!(
            "Unexpected resource type: got {got} expected: {expected}"
        )));
    }
    Ok(())
}

/// Walks the pages of one search
pub(crate) struct PageWalker<'a> {
    source: &'a dyn DataSource,
    context: &'a FetchContext,
}

impl<'a> PageWalker<'a> {
    pub(crate) fn new(source: &'a dyn DataSource, context: &'a FetchContext) -> Self {
        Self { source, context }
    }

    /// Validates `page` and takes its records
    ///
    /// Returns the records in entry order and, when the page links onward,
    /// the page itself (with its entries removed) to continue from.
    pub(crate) fn accept(&self, mut page: Bundle) -> Result<(Vec<Resource>, Option<Bundle>)> {
        check_freshness(&page, self.context.transaction_time())?;

        let expected = self.context.resource_type();
        let resources = std::mem::take(&mut page.entry)
            .into_iter()
            .map(|entry| {
                let resource = entry.resource.ok_or_else(|| {
                    MeridianError::Format(format!(
                        "Bundle entry {} has no resource, expected: {expected}",
                        entry.full_url.as_deref().unwrap_or("<no fullUrl>")
                    ))
                })?;
                check_category(&resource, expected)?;
                Ok(resource)
            })
            .collect::<Result<Vec<Resource>>>()?;

        let next = page.next_link().is_some().then_some(page);
        Ok((resources, next))
    }

    /// Requests the page after `page`; failures are not retried
    pub(crate) async fn next_page(&self, page: &Bundle) -> Result<Bundle> {
        tracing::trace!(
            job_id = %self.context.job_id(),
            next = page.next_link().unwrap_or_default(),
            "Following next link"
        );
        self.source.request_next_bundle(page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fetch::TimeWindow;
    use crate::domain::{BatchId, BeneficiaryId, BundleEntry, JobId, PatientId};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    struct NoSource;

    #[async_trait]
    impl DataSource for NoSource {
        async fn request_patient_by_identifier(
            &self,
            _patient_id: &PatientId,
        ) -> Result<Bundle> {
            unreachable!()
        }

        async fn request_patients(
            &self,
            _bene_id: &BeneficiaryId,
            _window: &TimeWindow,
        ) -> Result<Bundle> {
            unreachable!()
        }

        async fn request_eobs(
            &self,
            _bene_id: &BeneficiaryId,
            _window: &TimeWindow,
        ) -> Result<Bundle> {
            unreachable!()
        }

        async fn request_coverage(
            &self,
            _bene_id: &BeneficiaryId,
            _window: &TimeWindow,
        ) -> Result<Bundle> {
            unreachable!()
        }

        async fn request_next_bundle(&self, _bundle: &Bundle) -> Result<Bundle> {
            unreachable!()
        }

        fn base_url(&self) -> &str {
            "none"
        }
    }

    fn transaction_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn coverage(id: &str) -> Resource {
        Resource::new(json!({"resourceType": "Coverage", "id": id}))
    }

    #[test]
    fn test_freshness_accepts_missing_timestamp() {
        let page = Bundle::searchset(vec![]);
        assert!(check_freshness(&page, transaction_time()).is_ok());
    }

    #[test]
    fn test_freshness_accepts_equal_and_later() {
        let at = Bundle::searchset(vec![]).with_last_updated(transaction_time());
        let later =
            Bundle::searchset(vec![]).with_last_updated(transaction_time() + Duration::hours(1));
        assert!(check_freshness(&at, transaction_time()).is_ok());
        assert!(check_freshness(&later, transaction_time()).is_ok());
    }

    #[test]
    fn test_freshness_rejects_one_second_earlier() {
        let earlier = transaction_time() - Duration::seconds(1);
        let page = Bundle::searchset(vec![]).with_last_updated(earlier);

        match check_freshness(&page, transaction_time()) {
            Err(MeridianError::DataRegression {
                bundle_time,
                transaction_time: tt,
            }) => {
                assert_eq!(bundle_time, earlier);
                assert_eq!(tt, transaction_time());
            }
            other => panic!("expected data regression, got {other:?}"),
        }
    }

    #[test]
    fn test_category_check() {
        assert!(check_category(&coverage("a"), ResourceType::Coverage).is_ok());

        let err = check_category(&coverage("a"), ResourceType::Patient).unwrap_err();
        assert!(matches!(err, MeridianError::Format(_)));
        assert!(err.to_string().contains("got Coverage expected: Patient"));

        let untyped = Resource::new(json!({"id": "x"}));
        assert!(check_category(&untyped, ResourceType::Coverage).is_err());
    }

    #[test]
    fn test_accept_rejects_entry_without_resource() {
        let context = FetchContext::new(
            JobId::new(),
            BatchId::new(),
            ResourceType::Coverage,
            None,
            transaction_time(),
        )
        .unwrap();
        let walker = PageWalker::new(&NoSource, &context);

        let mut page = Bundle::searchset(vec![coverage("a")]);
        page.entry.push(BundleEntry {
            full_url: Some("urn:coverage:empty".to_string()),
            resource: None,
        });

        match walker.accept(page) {
            Err(MeridianError::Format(message)) => {
                assert!(message.contains("urn:coverage:empty"));
            }
            other => panic!("expected Format error, got {other:?}"),
        }

        let (records, next) = walker
            .accept(Bundle::searchset(vec![coverage("a"), coverage("b")]))
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(next.is_none());
    }
}
