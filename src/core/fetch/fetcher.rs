//! Resource fetch orchestration
//!
//! [`ResourceFetcher`] ties the pieces together for one patient and one
//! resource type:
//!
//! 1. resolve the external identifier (never retried, never converted)
//! 2. derive the time window
//! 3. pick the first-page request for the resource type
//! 4. run that request under the [`RetryPolicy`]
//! 5. walk the remaining pages, checking each one
//! 6. on retry exhaustion, emit a single [`OperationOutcome`] instead

use super::context::FetchContext;
use super::identity::resolve_beneficiary_id;
use super::outcome::translate_failure;
use super::pager::PageWalker;
use super::retry::RetryPolicy;
use super::window::TimeWindow;
use crate::adapters::upstream::DataSource;
use crate::domain::{
    BeneficiaryId, Bundle, MeridianError, OperationOutcome, PatientId, Resource, ResourceType,
    Result,
};
use crate::{log_fetch_complete, log_fetch_start};
use futures::stream::{self, Stream, TryStreamExt};
use std::sync::Arc;
use uuid::Uuid;

/// Complete result of a fetch
///
/// A fetch either produced every record of every page or nothing but one
/// outcome; there is no partial success.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// All records, in page order then entry order
    Resources(Vec<Resource>),
    /// The upstream source could not serve the request
    Outcome(OperationOutcome),
}

impl FetchResult {
    /// Number of records or outcomes carried
    pub fn len(&self) -> usize {
        match self {
            FetchResult::Resources(resources) => resources.len(),
            FetchResult::Outcome(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_outcome(&self) -> bool {
        matches!(self, FetchResult::Outcome(_))
    }
}

/// One element of a fetch stream
#[derive(Debug, Clone, PartialEq)]
pub enum FetchedItem {
    Resource(Resource),
    Outcome(OperationOutcome),
}

/// First-page request for each fetchable resource type
#[derive(Debug, Clone, Copy)]
enum FirstPageRequest {
    Patients,
    Eobs,
    Coverage,
}

impl FirstPageRequest {
    fn for_type(resource_type: ResourceType) -> Result<Self> {
        match resource_type {
            ResourceType::Patient => Ok(Self::Patients),
            ResourceType::ExplanationOfBenefit => Ok(Self::Eobs),
            ResourceType::Coverage => Ok(Self::Coverage),
            other => Err(MeridianError::Configuration(format!(
                "Unexpected resource type: {other}"
            ))),
        }
    }

    async fn send(
        self,
        source: &dyn DataSource,
        bene_id: &BeneficiaryId,
        window: &TimeWindow,
    ) -> Result<Bundle> {
        match self {
            Self::Patients => source.request_patients(bene_id, window).await,
            Self::Eobs => source.request_eobs(bene_id, window).await,
            Self::Coverage => source.request_coverage(bene_id, window).await,
        }
    }
}

enum FirstPage {
    Page(Bundle),
    Outcome(OperationOutcome),
}

enum Step {
    Start,
    Continue(Bundle),
    Done,
}

struct WalkState {
    step: Step,
    records: usize,
    pages: usize,
}

/// Fetches every record of one resource type for a patient
///
/// Holds no mutable state; one fetcher may serve any number of concurrent
/// fetches.
///
/// # Example
///
/// ```no_run
/// use meridian::adapters::upstream::create_data_source;
/// use meridian::config::UpstreamConfig;
/// use meridian::core::fetch::{FetchContext, FetchResult, ResourceFetcher, RetryPolicy};
/// use meridian::domain::{BatchId, JobId, PatientId, ResourceType};
///
/// # async fn example() -> meridian::domain::Result<()> {
/// let source = create_data_source(&UpstreamConfig::default())?;
/// let context = FetchContext::new(
///     JobId::new(),
///     BatchId::new(),
///     ResourceType::ExplanationOfBenefit,
///     None,
///     chrono::Utc::now(),
/// )?;
/// let fetcher = ResourceFetcher::new(source, context, RetryPolicy::default());
///
/// match fetcher.fetch_resources(&PatientId::new("MBI123").unwrap()).await? {
///     FetchResult::Resources(records) => println!("{} records", records.len()),
///     FetchResult::Outcome(outcome) => println!("failed: {:?}", outcome.details()),
/// }
/// # Ok(())
/// # }
/// ```
pub struct ResourceFetcher {
    source: Arc<dyn DataSource>,
    context: FetchContext,
    retry: RetryPolicy,
}

impl ResourceFetcher {
    pub fn new(source: Arc<dyn DataSource>, context: FetchContext, retry: RetryPolicy) -> Self {
        Self {
            source,
            context,
            retry,
        }
    }

    pub fn context(&self) -> &FetchContext {
        &self.context
    }

    /// Fetches and collects every record
    ///
    /// # Errors
    ///
    /// Propagates fatal failures: identity resolution, unsupported resource
    /// type, format and regression errors, and any failure while following
    /// `next` links. Records gathered before such a failure are discarded.
    pub async fn fetch_resources(&self, patient_id: &PatientId) -> Result<FetchResult> {
        let items = self.stream_resources(patient_id);
        futures::pin_mut!(items);

        let mut resources = Vec::new();
        while let Some(item) = items.try_next().await? {
            match item {
                FetchedItem::Resource(resource) => resources.push(resource),
                FetchedItem::Outcome(outcome) => return Ok(FetchResult::Outcome(outcome)),
            }
        }
        Ok(FetchResult::Resources(resources))
    }

    /// Lazily fetches records page by page
    ///
    /// Nothing is requested until the stream is polled. The stream yields
    /// either the records in order or exactly one outcome, and ends after the
    /// first error.
    pub fn stream_resources<'a>(
        &'a self,
        patient_id: &'a PatientId,
    ) -> impl Stream<Item = Result<FetchedItem>> + Send + 'a {
        let fetch_id = Uuid::new_v4();
        let initial = WalkState {
            step: Step::Start,
            records: 0,
            pages: 0,
        };

        stream::try_unfold(initial, move |state| async move {
            self.advance(state, patient_id, fetch_id).await
        })
        .map_ok(|items| stream::iter(items.into_iter().map(Ok::<_, MeridianError>)))
        .try_flatten()
    }

    async fn advance(
        &self,
        state: WalkState,
        patient_id: &PatientId,
        fetch_id: Uuid,
    ) -> Result<Option<(Vec<FetchedItem>, WalkState)>> {
        let walker = PageWalker::new(self.source.as_ref(), &self.context);

        let page = match state.step {
            Step::Done => return Ok(None),
            Step::Start => {
                log_fetch_start!(
                    fetch_id,
                    self.context.job_id(),
                    patient_id,
                    self.context.resource_type()
                );
                match self.first_page(patient_id).await? {
                    FirstPage::Page(page) => page,
                    FirstPage::Outcome(outcome) => {
                        let done = WalkState {
                            step: Step::Done,
                            ..state
                        };
                        return Ok(Some((vec![FetchedItem::Outcome(outcome)], done)));
                    }
                }
            }
            Step::Continue(previous) => walker.next_page(&previous).await?,
        };

        let (resources, next) = walker.accept(page)?;
        let records = state.records + resources.len();
        let pages = state.pages + 1;

        let step = match next {
            Some(page) => Step::Continue(page),
            None => {
                log_fetch_complete!(fetch_id, self.context.resource_type(), records, pages);
                Step::Done
            }
        };

        let items = resources.into_iter().map(FetchedItem::Resource).collect();
        Ok(Some((
            items,
            WalkState {
                step,
                records,
                pages,
            },
        )))
    }

    async fn first_page(&self, patient_id: &PatientId) -> Result<FirstPage> {
        let bene_id =
            resolve_beneficiary_id(self.source.as_ref(), &self.context, patient_id).await?;
        let window = self.context.window();
        let request = FirstPageRequest::for_type(self.context.resource_type())?;

        let source = self.source.as_ref();
        let result = self
            .retry
            .run(|attempt| {
                tracing::trace!(
                    attempt,
                    resource_type = %self.context.resource_type(),
                    "Requesting first page"
                );
                request.send(source, &bene_id, &window)
            })
            .await;

        match result {
            Ok(page) => Ok(FirstPage::Page(page)),
            Err(error) => translate_failure(self.context.resource_type(), patient_id, error)
                .map(FirstPage::Outcome),
        }
    }
}
