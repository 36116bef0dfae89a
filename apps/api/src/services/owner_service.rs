//! Owner service.

use tracing::debug;

use crate::error::ApiError;
use crate::AppState;
use rateboard_core::access::{require, Identity, Operation};
use rateboard_core::OwnerRollup;

/// Owner dashboard service.
pub struct OwnerService<'a> {
    state: &'a AppState,
}

impl<'a> OwnerService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        OwnerService { state }
    }

    /// The caller's own stores, their averages, and every rating of them.
    ///
    /// Scoped to the caller; there is no way to ask for another owner.
    pub async fn dashboard(&self, caller: Option<&Identity>) -> Result<OwnerRollup, ApiError> {
        let identity = require(caller, Operation::OwnerDashboard)?;

        let rollup = self
            .state
            .db
            .aggregates()
            .owner_rollup(&identity.user_id)
            .await?;

        debug!(
            owner_id = %identity.user_id,
            stores = rollup.stores.len(),
            ratings = rollup.ratings.len(),
            "Owner dashboard"
        );
        Ok(rollup)
    }
}
