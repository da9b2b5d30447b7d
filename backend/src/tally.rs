use std::collections::HashMap;
use shared::models::Charity;

// Every catalog charity appears in the result, zero-filled when unvoted.
pub fn compute_tallies(
    charities: &[Charity],
    counts: &HashMap<String, i64>,
) -> HashMap<String, i64> {
    charities
        .iter()
        .map(|charity| {
            let count = counts.get(&charity.id).copied().unwrap_or(0);
            (charity.id.clone(), count)
        })
        .collect()
}
