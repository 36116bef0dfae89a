//! # Rating Aggregates
//!
//! Pure arithmetic over rating rows. The database layer feeds in sums and
//! counts from grouped queries; this module owns what they mean.
//!
//! ```text
//! ratings (store_id, value)            StoreAggregate
//! ─────────────────────────            ──────────────────────────────
//! s1  4 ┐                              s1 → { average: 4.5, count: 2 }
//! s1  5 ┘── GROUP BY store_id ──►      s2 → { average: 3.0, count: 1 }
//! s2  3                                s3 → { average: null, count: 0 }
//! ```
//!
//! Nothing here is cached or updated incrementally: every aggregate is
//! re-derived from the current rows.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{RatingDetail, Store};

/// Average and count of the ratings of one store.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoreAggregate {
    /// Unrounded mean; `None` when there are no ratings.
    pub average: Option<f64>,
    pub count: i64,
}

impl StoreAggregate {
    /// Aggregate of a store nobody has rated.
    pub const EMPTY: StoreAggregate = StoreAggregate {
        average: None,
        count: 0,
    };

    /// Builds an aggregate from a grouped `SUM`/`COUNT` pair.
    pub fn from_sum_count(sum: i64, count: i64) -> Self {
        if count <= 0 {
            return StoreAggregate::EMPTY;
        }
        StoreAggregate {
            average: Some(sum as f64 / count as f64),
            count,
        }
    }

    /// Builds an aggregate directly from rating values.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let (sum, count) = values
            .into_iter()
            .fold((0i64, 0i64), |(sum, count), v| (sum + v, count + 1));
        StoreAggregate::from_sum_count(sum, count)
    }
}

/// A store id paired with its aggregate, as listed on the owner dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoreAverage {
    pub store_id: String,
    pub average: Option<f64>,
    pub count: i64,
}

/// Everything an owner sees about the stores they own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OwnerRollup {
    pub stores: Vec<Store>,
    pub averages: Vec<StoreAverage>,
    pub ratings: Vec<RatingDetail>,
}

impl OwnerRollup {
    /// Assembles a rollup, listing one average per owned store in store order.
    ///
    /// Stores absent from `aggregates` are reported as unrated.
    pub fn assemble(
        stores: Vec<Store>,
        aggregates: &HashMap<String, StoreAggregate>,
        ratings: Vec<RatingDetail>,
    ) -> Self {
        let averages = stores
            .iter()
            .map(|store| {
                let agg = aggregates
                    .get(&store.id)
                    .copied()
                    .unwrap_or(StoreAggregate::EMPTY);
                StoreAverage {
                    store_id: store.id.clone(),
                    average: agg.average,
                    count: agg.count,
                }
            })
            .collect();

        OwnerRollup {
            stores,
            averages,
            ratings,
        }
    }

    /// True when the owner has no stores.
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn store(id: &str) -> Store {
        Store {
            id: id.to_string(),
            name: format!("Store {id}"),
            email: None,
            address: None,
            owner_id: Some("owner".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_average_is_exact_mean() {
        let agg = StoreAggregate::from_values([4, 5]);
        assert_eq!(agg.average, Some(4.5));
        assert_eq!(agg.count, 2);

        let agg = StoreAggregate::from_values([1, 2, 2]);
        assert_eq!(agg.average, Some(5.0 / 3.0));
    }

    #[test]
    fn test_no_ratings_has_null_average() {
        assert_eq!(StoreAggregate::from_values(Vec::<i64>::new()), StoreAggregate::EMPTY);
        assert_eq!(StoreAggregate::from_sum_count(0, 0).average, None);
    }

    #[test]
    fn test_assemble_fills_unrated_stores() {
        let mut aggregates = HashMap::new();
        aggregates.insert("a".to_string(), StoreAggregate::from_values([3]));

        let rollup = OwnerRollup::assemble(vec![store("a"), store("b")], &aggregates, vec![]);

        assert_eq!(rollup.averages.len(), 2);
        assert_eq!(rollup.averages[0].average, Some(3.0));
        assert_eq!(rollup.averages[1].store_id, "b");
        assert_eq!(rollup.averages[1].average, None);
        assert_eq!(rollup.averages[1].count, 0);
    }

    #[test]
    fn test_empty_rollup() {
        let rollup = OwnerRollup::assemble(vec![], &HashMap::new(), vec![]);
        assert!(rollup.is_empty());
        assert!(rollup.averages.is_empty());
        assert!(rollup.ratings.is_empty());
    }
}
