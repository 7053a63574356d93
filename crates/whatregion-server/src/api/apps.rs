use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, Sse},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tokio_stream::{wrappers::UnboundedReceiverStream, Stream, StreamExt};
use whatregion_core::{find_region, CanonicalAppId, RegionAvailability};
use whatregion_itunes::{AppRecord, BoardSnapshot, LookupEvent, Session};

use crate::middleware::RequestId;

use super::{parse_app_id, ApiError, ApiResponse, AppState, ResponseMeta};

/// `?refresh=true` drops cached results for the app, failures included,
/// before looking it up again.
#[derive(Debug, Default, Deserialize)]
pub(super) struct RefreshQuery {
    #[serde(default)]
    pub refresh: bool,
}

impl RefreshQuery {
    async fn apply(&self, state: &AppState, app_id: &CanonicalAppId) {
        if self.refresh {
            state.aggregator.refresh(app_id).await;
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct AppItem {
    app_id: CanonicalAppId,
    region: &'static str,
    store_url: String,
    record: AppRecord,
}

#[derive(Debug, Serialize)]
pub(super) struct RegionItem {
    app_id: CanonicalAppId,
    store_url: String,
    #[serde(flatten)]
    availability: RegionAvailability,
}

#[derive(Debug, Serialize)]
struct BaselinePayload<'a> {
    app_id: &'a CanonicalAppId,
    record: Option<&'a AppRecord>,
}

#[derive(Debug, Serialize)]
struct DonePayload<'a> {
    app_id: &'a CanonicalAppId,
    regions: usize,
}

pub(super) async fn get_app(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(input): Path<String>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<ApiResponse<AppItem>>, ApiError> {
    let app_id = parse_app_id(&req_id.0, &input)?;
    query.apply(&state, &app_id).await;
    let baseline = state.aggregator.baseline_region();

    let Some(record) = state.aggregator.baseline(&app_id).await else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("app {app_id} has no listing in {}", baseline.name),
        ));
    };

    Ok(Json(ApiResponse {
        data: AppItem {
            store_url: baseline.store_url(app_id.as_str()),
            app_id,
            region: baseline.code,
            record,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_app_regions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(input): Path<String>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<ApiResponse<BoardSnapshot>>, ApiError> {
    let app_id = parse_app_id(&req_id.0, &input)?;
    query.apply(&state, &app_id).await;

    let mut session = Session::new(state.aggregator);
    session.check_id(app_id);
    session.settle().await;
    let snapshot = session.snapshot();

    tracing::info!(
        app_id = ?snapshot.app_id,
        available = snapshot.summary.available,
        total = snapshot.summary.total,
        "region check complete"
    );

    Ok(Json(ApiResponse {
        data: snapshot,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn stream_app_regions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(input): Path<String>,
    Query(query): Query<RefreshQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let app_id = parse_app_id(&req_id.0, &input)?;
    query.apply(&state, &app_id).await;
    let total = state.aggregator.regions().len();

    let events = UnboundedReceiverStream::new(state.aggregator.stream(&app_id)).map(|event| {
        let built = match &event {
            LookupEvent::Region { availability, .. } => {
                Event::default().event("region").json_data(availability)
            }
            LookupEvent::Baseline { app_id, record, .. } => {
                Event::default().event("baseline").json_data(BaselinePayload {
                    app_id,
                    record: record.as_deref(),
                })
            }
        };
        Ok::<_, Infallible>(sse_event(built))
    });

    let done = sse_event(Event::default().event("done").json_data(DonePayload {
        app_id: &app_id,
        regions: total,
    }));

    Ok(Sse::new(events.chain(tokio_stream::once(Ok::<_, Infallible>(done)))))
}

/// Falls back to a comment-only event when a payload fails to encode.
fn sse_event(built: Result<Event, axum::Error>) -> Event {
    built.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to encode sse payload");
        Event::default().comment("encode error")
    })
}

pub(super) async fn get_app_region(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((input, code)): Path<(String, String)>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<ApiResponse<RegionItem>>, ApiError> {
    let app_id = parse_app_id(&req_id.0, &input)?;
    let Some(region) = find_region(&code) else {
        return Err(ApiError::new(
            req_id.0,
            "unknown_region",
            format!("{code:?} is not a storefront code"),
        ));
    };

    if query.refresh {
        state.aggregator.cache().invalidate(&app_id, region.code).await;
    }
    let availability = state.aggregator.check_region(&app_id, region).await;

    Ok(Json(ApiResponse {
        data: RegionItem {
            store_url: region.store_url(app_id.as_str()),
            app_id,
            availability,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
