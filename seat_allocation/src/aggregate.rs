use log::debug;
use std::collections::HashMap;

use crate::config::*;

/// The key under which parties running in different districts are merged:
/// trimmed and lower-cased name. Identifiers are not used because they are only
/// unique within a district.
pub fn party_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Merges vote records by party name.
///
/// The parties are returned in the order in which they are first seen, under
/// the (trimmed) name of their first record.
pub fn aggregate_votes(records: &[PartyVoteRecord]) -> Vec<PartyTotal> {
    merge_by_name(records.iter().map(|r| (r.name.as_str(), r.votes, None, false)))
}

/// Merges allocation results by party name, also summing the seats.
///
/// The merged seats are meant for display. They are never used to recompute
/// an allocation.
pub fn aggregate_results(results: &[SeatAllocationResult]) -> Vec<PartyTotal> {
    merge_by_name(results.iter().map(|r| {
        (
            r.name.as_str(),
            r.votes,
            Some(r.total_seats as u64),
            r.bonus_seat,
        )
    }))
}

fn merge_by_name<'a>(
    entries: impl Iterator<Item = (&'a str, u64, Option<u64>, bool)>,
) -> Vec<PartyTotal> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut res: Vec<PartyTotal> = Vec::new();
    for (name, votes, seats, bonus) in entries {
        let key = party_key(name);
        let pos = *positions.entry(key).or_insert_with(|| {
            res.push(PartyTotal {
                name: name.trim().to_string(),
                votes: 0,
                seats: None,
                bonus_seats: 0,
            });
            res.len() - 1
        });
        let pt = &mut res[pos];
        pt.votes += votes;
        if let Some(s) = seats {
            pt.seats = Some(pt.seats.unwrap_or(0) + s);
        }
        if bonus {
            pt.bonus_seats += 1;
        }
    }
    debug!("merge_by_name: {} parties", res.len());
    res
}
