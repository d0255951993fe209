use crate::shift::counts::model::catalog::{PILES, RSP_TOTAL};
use crate::shift::counts::model::{Dataset, Quarter};

/// RSP total piles per quarter, in shift order, for every quarter that has
/// an `RSP (Total)` record. Unreported piles count as zero.
pub fn piles_trend(dataset: &Dataset) -> Vec<(Quarter, u64)> {
    dataset
        .iter()
        .filter_map(|(quarter, roles)| {
            roles
                .get(RSP_TOTAL)
                .map(|record| (quarter, record.get(PILES).unwrap_or(0)))
        })
        .collect()
}
