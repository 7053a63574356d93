use axum::{extract::Query, Extension, Json};
use serde::{Deserialize, Serialize};
use whatregion_core::{normalize_app_id, regions_by_continent, CanonicalAppId, Continent, Region};

use crate::middleware::RequestId;

use super::{ApiResponse, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ContinentItem {
    continent: Continent,
    name: &'static str,
    regions: Vec<&'static Region>,
}

#[derive(Debug, Deserialize)]
pub(super) struct NormalizeQuery {
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Serialize)]
pub(super) struct NormalizeItem {
    input: String,
    app_id: String,
    /// True when `app_id` is usable for lookups.
    is_canonical: bool,
}

pub(super) async fn list_regions(
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<ContinentItem>>> {
    let data = regions_by_continent()
        .into_iter()
        .map(|(continent, regions)| ContinentItem {
            continent,
            name: continent.display_name(),
            regions,
        })
        .collect();

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn normalize(
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<NormalizeQuery>,
) -> Json<ApiResponse<NormalizeItem>> {
    let app_id = normalize_app_id(&query.input);
    let is_canonical = CanonicalAppId::parse(&app_id).is_ok();

    Json(ApiResponse {
        data: NormalizeItem {
            input: query.input,
            app_id,
            is_canonical,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
