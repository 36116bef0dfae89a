//! Store service.
//!
//! The public store listing and rating submission.
//!
//! ## Listing Assembly
//! ```text
//! StoreQuery ──► stores().list()          one page + total
//!                    │
//!                    ├──► aggregates().batch_store_aggregates(ids)   1 query
//!                    └──► ratings().my_ratings(caller, ids)          1 query,
//!                                                only for USER / OWNER
//!                    ▼
//!              Page<StoreListItem>
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::services::ListParams;
use crate::AppState;
use rateboard_core::access::{authorize, require, Identity, Operation};
use rateboard_core::query::StoreQuery;
use rateboard_core::validation::parse_rating;
use rateboard_core::{Page, StoreAggregate, StoreListItem};

/// Rating payload. `rating` stays a raw JSON value until validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RateRequest {
    pub rating: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateResponse {
    pub ok: bool,
    pub rating: i64,
}

/// Store listing and rating service.
pub struct StoreService<'a> {
    state: &'a AppState,
}

impl<'a> StoreService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        StoreService { state }
    }

    /// Lists stores with their average rating, and the caller's own rating
    /// when the caller is a rater.
    ///
    /// Supports `q` (name or address), `name`, `address`, sorting and
    /// paging.
    pub async fn list(
        &self,
        caller: Option<&Identity>,
        params: &ListParams,
    ) -> Result<Page<StoreListItem>, ApiError> {
        let caller = authorize(caller, Operation::ListStores)?;

        let mut raw = params.as_raw();
        raw.email = None;
        let query = StoreQuery::parse(&raw)?;

        let page = self.state.db.stores().list(&query).await?;
        let ids: Vec<&str> = page.items.iter().map(|s| s.id.as_str()).collect();

        let aggregates = self.state.db.aggregates().batch_store_aggregates(&ids).await?;
        let mine = match caller.filter(|c| c.can_view_own_ratings()) {
            Some(identity) => {
                self.state
                    .db
                    .ratings()
                    .my_ratings(&identity.user_id, &ids)
                    .await?
            }
            None => Default::default(),
        };

        Ok(page.map(|store| {
            let aggregate = aggregates
                .get(&store.id)
                .copied()
                .unwrap_or(StoreAggregate::EMPTY);
            StoreListItem {
                overall_rating: aggregate.average,
                my_rating: mine.get(&store.id).copied(),
                id: store.id,
                name: store.name,
                address: store.address,
            }
        }))
    }

    /// Creates or replaces the caller's rating of a store.
    ///
    /// Order of checks: identity, rating value, store existence.
    pub async fn rate(
        &self,
        caller: Option<&Identity>,
        store_id: &str,
        req: &RateRequest,
    ) -> Result<RateResponse, ApiError> {
        let identity = require(caller, Operation::RateStore)?;
        let value = parse_rating(&req.rating)?;

        let outcome = self
            .state
            .db
            .ratings()
            .upsert(&identity.user_id, store_id, value)
            .await?;

        info!(
            user_id = %identity.user_id,
            store_id,
            rating = outcome.rating.value,
            created = outcome.created,
            "Store rated"
        );
        Ok(RateResponse {
            ok: true,
            rating: outcome.rating.value,
        })
    }
}
