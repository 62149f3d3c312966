mod aggregate;
pub mod builder;
pub mod color;
mod config;
pub mod manual;

use log::{debug, info};

use std::collections::HashSet;

pub use crate::aggregate::*;
pub use crate::config::*;

// **** Private structures ****

/// The identifier of the pseudo-district used for island-wide allocations.
pub const ISLAND_DISTRICT: &str = "island";

// A qualified party, as it goes through the rounds.
#[derive(Eq, PartialEq, Debug, Clone)]
struct Contender {
    // Position of the party in the input list.
    idx: usize,
    votes: u64,
    // Votes not yet turned into seats.
    remaining: u64,
    bonus: bool,
    first_round: u32,
    second_round: u32,
}

impl Contender {
    fn new(idx: usize, votes: u64) -> Contender {
        Contender {
            idx,
            votes,
            remaining: votes,
            bonus: false,
            first_round: 0,
            second_round: 0,
        }
    }
}

/// Runs the seat allocation of one district with the default rules.
///
/// Arguments:
/// * `parties` the parties running in the district, with their votes
/// * `district_total_votes` the gross number of votes cast in the district. It is
///   used both for the qualification threshold and as the number of valid votes.
/// * `district_seat_count` the number of seats to fill
///
/// The result contains exactly one entry per party, in the input order.
pub fn allocate_seats(
    parties: &[PartyVoteRecord],
    district_total_votes: u64,
    district_seat_count: u32,
) -> Vec<SeatAllocationResult> {
    run_allocation(
        parties,
        district_total_votes,
        district_total_votes,
        district_seat_count,
        &AllocationRules::DEFAULT_RULES,
    )
}

/// Runs the seat allocation of one district, after checking the consistency of
/// the inputs.
///
/// The qualification threshold is computed on the total votes, the seat quota on
/// the valid votes (total minus rejected).
pub fn allocate_district(
    summary: &DistrictVoteSummary,
    parties: &[PartyVoteRecord],
    rules: &AllocationRules,
) -> Result<Vec<SeatAllocationResult>, AllocationErrors> {
    checks(summary, parties)?;
    Ok(run_allocation(
        parties,
        summary.total_votes,
        summary.valid_votes(),
        summary.seat_count,
        rules,
    ))
}

/// Runs the seat allocation over island-wide totals, as produced by
/// [aggregate_votes].
///
/// Each party is identified by its [party_key] in the result.
pub fn allocate_island(
    totals: &[PartyTotal],
    total_votes: u64,
    rejected_votes: u64,
    seat_count: u32,
    rules: &AllocationRules,
) -> Result<Vec<SeatAllocationResult>, AllocationErrors> {
    let records: Vec<PartyVoteRecord> = totals
        .iter()
        .map(|pt| PartyVoteRecord {
            id: party_key(&pt.name),
            name: pt.name.clone(),
            votes: pt.votes,
            district_id: ISLAND_DISTRICT.to_string(),
        })
        .collect();
    let summary = DistrictVoteSummary {
        district_id: ISLAND_DISTRICT.to_string(),
        total_votes,
        rejected_votes,
        seat_count,
    };
    allocate_district(&summary, &records, rules)
}

fn checks(
    summary: &DistrictVoteSummary,
    parties: &[PartyVoteRecord],
) -> Result<(), AllocationErrors> {
    if summary.rejected_votes > summary.total_votes {
        return Err(AllocationErrors::RejectedExceedsTotal {
            district: summary.district_id.clone(),
            total: summary.total_votes,
            rejected: summary.rejected_votes,
        });
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for p in parties.iter() {
        if p.district_id != summary.district_id {
            return Err(AllocationErrors::ForeignParty {
                district: summary.district_id.clone(),
                party: p.id.clone(),
            });
        }
        if !seen.insert(p.id.as_str()) {
            return Err(AllocationErrors::DuplicateParty {
                district: summary.district_id.clone(),
                party: p.id.clone(),
            });
        }
    }
    Ok(())
}

fn run_allocation(
    parties: &[PartyVoteRecord],
    total_votes: u64,
    valid_votes: u64,
    seat_count: u32,
    rules: &AllocationRules,
) -> Vec<SeatAllocationResult> {
    info!(
        "Allocating {} seats among {} parties (total votes: {}, valid votes: {}, rules: {:?})",
        seat_count,
        parties.len(),
        total_votes,
        valid_votes,
        rules
    );

    let (mut contenders, disqualified_votes) = qualify(parties, total_votes, rules);

    let bonus_seats = if rules.bonus_seat {
        award_bonus_seats(&mut contenders, seat_count)
    } else {
        0
    };

    let seats_left = seat_count - bonus_seats;
    let seats_valid_votes = valid_votes.saturating_sub(disqualified_votes);
    apportion(&mut contenders, seats_valid_votes, seats_left);

    let res = compose(parties, &contenders, valid_votes);
    for r in res.iter() {
        info!(
            "{:>10} {} ({:.1}%) -> {} seats{}",
            r.votes,
            r.name,
            r.percentage,
            r.total_seats,
            if r.qualified { "" } else { " (disqualified)" }
        );
    }
    res
}

/// Returns the qualified parties, sorted by decreasing votes (input order for
/// equal votes), and the votes of the disqualified ones.
fn qualify(
    parties: &[PartyVoteRecord],
    total_votes: u64,
    rules: &AllocationRules,
) -> (Vec<Contender>, u64) {
    let mut contenders: Vec<Contender> = Vec::new();
    let mut disqualified_votes: u64 = 0;
    for (idx, p) in parties.iter().enumerate() {
        if rules.qualifies(p.votes, total_votes) {
            contenders.push(Contender::new(idx, p.votes));
        } else {
            debug!(
                "qualify: {} disqualified with {} votes (threshold {})",
                p.name,
                p.votes,
                rules.threshold(total_votes)
            );
            disqualified_votes += p.votes;
        }
    }
    // Stable sort: equal votes keep the input order.
    contenders.sort_by(|a, b| b.votes.cmp(&a.votes));
    debug!("qualify: contenders: {:?}", contenders);
    (contenders, disqualified_votes)
}

/// Flags all the leading parties and returns the number of bonus seats granted.
fn award_bonus_seats(contenders: &mut [Contender], seat_count: u32) -> u32 {
    let max_votes = match contenders.iter().map(|c| c.votes).max() {
        Some(x) => x,
        None => return 0,
    };
    let num_leaders = contenders.iter().filter(|c| c.votes == max_votes).count() as u32;
    // Not enough seats to reward every leader: nobody gets a bonus.
    if num_leaders > seat_count {
        debug!(
            "award_bonus_seats: {} leaders for {} seats, no bonus seat",
            num_leaders, seat_count
        );
        return 0;
    }
    for c in contenders.iter_mut().filter(|c| c.votes == max_votes) {
        c.bonus = true;
    }
    debug!(
        "award_bonus_seats: {} bonus seats at {} votes",
        num_leaders, max_votes
    );
    num_leaders
}

fn apportion(contenders: &mut [Contender], seats_valid_votes: u64, seats: u32) {
    if seats == 0 || contenders.is_empty() {
        debug!("apportion: nothing to distribute");
        return;
    }
    let mut seats_left = seats;
    let votes_per_seat = seats_valid_votes / seats as u64;
    debug!(
        "apportion: {} seats, {} votes per seat",
        seats, votes_per_seat
    );

    // First round: whole quotas, one seat per party and per sweep.
    if votes_per_seat > 0 {
        let mut num_sweeps = 0;
        while seats_left > 0 {
            let mut absorbed = false;
            for c in contenders.iter_mut() {
                if seats_left == 0 {
                    break;
                }
                if c.remaining >= votes_per_seat {
                    c.remaining -= votes_per_seat;
                    c.first_round += 1;
                    seats_left -= 1;
                    absorbed = true;
                }
            }
            num_sweeps += 1;
            if !absorbed {
                break;
            }
        }
        debug!(
            "apportion: first round done after {} sweeps, {} seats left",
            num_sweeps, seats_left
        );
    }

    // Second round: largest remainders, cycling if there are more seats than parties.
    if seats_left > 0 {
        let mut ranking: Vec<usize> = (0..contenders.len()).collect();
        ranking.sort_by(|&a, &b| {
            let (ca, cb) = (&contenders[a], &contenders[b]);
            cb.remaining
                .cmp(&ca.remaining)
                .then_with(|| cb.votes.cmp(&ca.votes))
                .then_with(|| ca.idx.cmp(&cb.idx))
        });
        debug!("apportion: remainder ranking: {:?}", ranking);
        for &pos in ranking.iter().cycle().take(seats_left as usize) {
            contenders[pos].second_round += 1;
        }
    }
}

fn compose(
    parties: &[PartyVoteRecord],
    contenders: &[Contender],
    valid_votes: u64,
) -> Vec<SeatAllocationResult> {
    parties
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let percentage = percentage(p.votes, valid_votes);
            match contenders.iter().find(|c| c.idx == idx) {
                Some(c) => SeatAllocationResult {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    votes: p.votes,
                    percentage,
                    qualified: true,
                    bonus_seat: c.bonus,
                    first_round_seats: c.first_round,
                    second_round_seats: c.second_round,
                    total_seats: c.first_round + c.second_round + u32::from(c.bonus),
                },
                None => SeatAllocationResult::unallocated(p, percentage),
            }
        })
        .collect()
}

/// Share of the valid votes, 0 when there is no valid vote.
pub fn percentage(votes: u64, valid_votes: u64) -> f64 {
    if valid_votes == 0 {
        0.0
    } else {
        (votes as f64 / valid_votes as f64 * 100.0).min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn parties(votes: &[(&str, u64)]) -> Vec<PartyVoteRecord> {
        votes
            .iter()
            .map(|(name, v)| PartyVoteRecord {
                id: name.to_lowercase(),
                name: name.to_string(),
                votes: *v,
                district_id: "d1".to_string(),
            })
            .collect()
    }

    fn seats_of<'a>(res: &'a [SeatAllocationResult], name: &str) -> &'a SeatAllocationResult {
        res.iter().find(|r| r.name == name).unwrap()
    }

    fn total(res: &[SeatAllocationResult]) -> u32 {
        res.iter().map(|r| r.total_seats).sum()
    }

    #[test]
    fn three_parties_five_seats() {
        init_logger();
        let ps = parties(&[("A", 600), ("B", 300), ("C", 100)]);
        let res = allocate_seats(&ps, 1000, 5);
        assert_eq!(res.len(), 3);
        assert_eq!(total(&res), 5);
        let a = seats_of(&res, "A");
        assert!(a.bonus_seat);
        assert_eq!(a.first_round_seats, 2);
        assert!(a.total_seats == 3 || a.total_seats == 4);
        let b = seats_of(&res, "B");
        assert!(!b.bonus_seat);
        assert_eq!(b.first_round_seats, 1);
        assert_eq!(b.total_seats, 1);
        assert!(seats_of(&res, "C").total_seats <= 1);
        assert!(res.iter().all(|r| r.qualified));
    }

    #[test]
    fn equal_remainders_go_to_the_larger_party() {
        init_logger();
        let ps = parties(&[("C", 100), ("B", 300), ("A", 600)]);
        let res = allocate_seats(&ps, 1000, 5);
        let a = seats_of(&res, "A");
        assert_eq!(
            (a.first_round_seats, a.second_round_seats, a.total_seats),
            (2, 1, 4)
        );
        assert_eq!(seats_of(&res, "C").total_seats, 0);
        // The input order is preserved.
        let names: Vec<&str> = res.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn percentages() {
        let ps = parties(&[("A", 600), ("B", 300), ("C", 100)]);
        let res = allocate_seats(&ps, 1000, 5);
        assert_eq!(seats_of(&res, "A").percentage, 60.0);
        assert_eq!(seats_of(&res, "B").percentage, 30.0);
        assert_eq!(seats_of(&res, "C").percentage, 10.0);
    }

    #[test]
    fn disqualification_boundary() {
        init_logger();
        // 5% of 1000 is 50: strictly more is required.
        let ps = parties(&[("A", 899), ("B", 50), ("C", 51)]);
        let res = allocate_seats(&ps, 1000, 4);
        let b = seats_of(&res, "B");
        assert!(!b.qualified);
        assert_eq!(b.total_seats, 0);
        assert_eq!(b.percentage, 5.0);
        assert!(seats_of(&res, "C").qualified);
        assert_eq!(total(&res), 4);
    }

    #[test]
    fn disqualification_boundary_fractional_threshold() {
        // 5% of 1010 is 50.5.
        let ps = parties(&[("A", 909), ("B", 50), ("C", 51)]);
        let res = allocate_seats(&ps, 1010, 3);
        assert!(!seats_of(&res, "B").qualified);
        assert!(seats_of(&res, "C").qualified);
    }

    #[test]
    fn bonus_seat_ties() {
        init_logger();
        let ps = parties(&[("A", 400), ("B", 400), ("C", 200)]);
        let res = allocate_seats(&ps, 1000, 6);
        let a = seats_of(&res, "A");
        let b = seats_of(&res, "B");
        assert!(a.bonus_seat && b.bonus_seat);
        assert!(!seats_of(&res, "C").bonus_seat);
        // 4 seats left, 250 votes per seat.
        assert_eq!(a.first_round_seats + b.first_round_seats, 2);
        let proportional: u32 = res
            .iter()
            .map(|r| r.first_round_seats + r.second_round_seats)
            .sum();
        assert_eq!(proportional, 4);
        assert_eq!(total(&res), 6);
    }

    #[test]
    fn too_many_leaders_for_the_seats() {
        let ps = parties(&[("A", 500), ("B", 500)]);
        let res = allocate_seats(&ps, 1000, 1);
        assert!(res.iter().all(|r| !r.bonus_seat));
        assert_eq!(total(&res), 1);
        // Equal remainders and votes: the first listed party.
        assert_eq!(seats_of(&res, "A").total_seats, 1);
    }

    #[test]
    fn idempotence() {
        let ps = parties(&[("A", 713), ("B", 291), ("C", 377), ("D", 12), ("E", 377)]);
        let r1 = allocate_seats(&ps, 1800, 11);
        let r2 = allocate_seats(&ps, 1800, 11);
        assert_eq!(r1, r2);
    }

    #[test]
    fn zero_votes_district() {
        init_logger();
        let ps = parties(&[("A", 3), ("B", 0), ("C", 1)]);
        let res = allocate_seats(&ps, 0, 3);
        assert!(seats_of(&res, "A").qualified);
        assert!(seats_of(&res, "C").qualified);
        let b = seats_of(&res, "B");
        assert!(!b.qualified);
        assert_eq!(b.total_seats, 0);
        assert!(res.iter().all(|r| r.percentage == 0.0));
        assert_eq!(total(&res), 3);
    }

    #[test]
    fn single_party_gets_everything() {
        let ps = parties(&[("A", 1234)]);
        let res = allocate_seats(&ps, 1234, 7);
        let a = &res[0];
        assert_eq!(a.percentage, 100.0);
        assert!(a.bonus_seat);
        assert_eq!(a.total_seats, 7);
    }

    #[test]
    fn zero_seats() {
        let ps = parties(&[("A", 600), ("B", 400)]);
        let res = allocate_seats(&ps, 1000, 0);
        assert_eq!(res.len(), 2);
        assert_eq!(total(&res), 0);
        assert!(res.iter().all(|r| !r.bonus_seat));
    }

    #[test]
    fn empty_district() {
        let res = allocate_seats(&[], 1000, 5);
        assert!(res.is_empty());
    }

    #[test]
    fn nobody_qualifies() {
        let ps = parties(&[("A", 10), ("B", 20)]);
        let res = allocate_seats(&ps, 1000, 5);
        assert_eq!(total(&res), 0);
        assert!(res.iter().all(|r| !r.qualified));
    }

    #[test]
    fn seats_run_out_during_the_first_round() {
        init_logger();
        // 4 seats left after the bonus, 2 votes per seat, 5 whole quotas available.
        let ps = parties(&[("A", 4), ("B", 3), ("C", 3)]);
        let res = allocate_seats(&ps, 10, 5);
        assert_eq!(total(&res), 5);
        assert!(res.iter().all(|r| r.second_round_seats == 0));
        let a = seats_of(&res, "A");
        assert_eq!(a.total_seats, 3);
        assert_eq!(seats_of(&res, "B").total_seats, 1);
        assert_eq!(seats_of(&res, "C").total_seats, 1);
    }

    #[test]
    fn more_seats_than_votes_cycles_the_remainders() {
        let ps = parties(&[("A", 2), ("B", 1)]);
        let res = allocate_seats(&ps, 3, 6);
        // 5 seats left, 0 votes per seat: everything goes to the second round.
        assert_eq!(seats_of(&res, "A").first_round_seats, 0);
        assert_eq!(seats_of(&res, "A").second_round_seats, 3);
        assert_eq!(seats_of(&res, "B").second_round_seats, 2);
        assert_eq!(total(&res), 6);
    }

    #[test]
    fn disqualified_votes_do_not_count_for_the_quota() {
        let ps = parties(&[("A", 500), ("B", 460), ("C", 40)]);
        let res = allocate_seats(&ps, 1000, 3);
        // 2 seats left, quota (1000 - 40) / 2 = 480.
        let a = seats_of(&res, "A");
        assert_eq!(a.first_round_seats, 1);
        let b = seats_of(&res, "B");
        assert_eq!((b.first_round_seats, b.second_round_seats), (0, 1));
        assert!(!seats_of(&res, "C").qualified);
    }

    #[test]
    fn conservation_on_many_districts() {
        for seats in 0..12u32 {
            for spread in 1..20u64 {
                let ps = parties(&[
                    ("A", 1000 + spread * 37),
                    ("B", 800 - spread * 11),
                    ("C", 50 * spread),
                    ("D", 61),
                    ("E", spread),
                ]);
                let total_votes: u64 = ps.iter().map(|p| p.votes).sum();
                let res = allocate_seats(&ps, total_votes, seats);
                assert_eq!(total(&res), seats, "seats {} spread {}", seats, spread);
            }
        }
    }

    #[test]
    fn rules_without_bonus() {
        let ps = parties(&[("A", 600), ("B", 300), ("C", 100)]);
        let rules = AllocationRules {
            threshold_percent: 5,
            bonus_seat: false,
        };
        let summary = DistrictVoteSummary {
            district_id: "d1".to_string(),
            total_votes: 1000,
            rejected_votes: 0,
            seat_count: 10,
        };
        let res = allocate_district(&summary, &ps, &rules).unwrap();
        assert!(res.iter().all(|r| !r.bonus_seat));
        assert_eq!(seats_of(&res, "A").total_seats, 6);
        assert_eq!(seats_of(&res, "B").total_seats, 3);
        assert_eq!(seats_of(&res, "C").total_seats, 1);
    }

    #[test]
    fn district_uses_valid_votes() {
        let ps = parties(&[("A", 450), ("B", 450)]);
        let summary = DistrictVoteSummary {
            district_id: "d1".to_string(),
            total_votes: 1000,
            rejected_votes: 100,
            seat_count: 4,
        };
        let res = allocate_district(&summary, &ps, &AllocationRules::DEFAULT_RULES).unwrap();
        assert_eq!(seats_of(&res, "A").percentage, 50.0);
        assert_eq!(seats_of(&res, "A").total_seats, 2);
        assert_eq!(seats_of(&res, "B").total_seats, 2);
    }

    #[test]
    fn district_checks() {
        let summary = DistrictVoteSummary {
            district_id: "d1".to_string(),
            total_votes: 100,
            rejected_votes: 101,
            seat_count: 4,
        };
        assert!(matches!(
            allocate_district(&summary, &[], &AllocationRules::DEFAULT_RULES),
            Err(AllocationErrors::RejectedExceedsTotal { .. })
        ));

        let summary = DistrictVoteSummary {
            rejected_votes: 0,
            ..summary
        };
        let mut ps = parties(&[("A", 60), ("A", 40)]);
        assert_eq!(
            allocate_district(&summary, &ps, &AllocationRules::DEFAULT_RULES),
            Err(AllocationErrors::DuplicateParty {
                district: "d1".to_string(),
                party: "a".to_string()
            })
        );

        ps[1].id = "b".to_string();
        ps[1].district_id = "d2".to_string();
        assert!(matches!(
            allocate_district(&summary, &ps, &AllocationRules::DEFAULT_RULES),
            Err(AllocationErrors::ForeignParty { .. })
        ));
    }

    #[test]
    fn negative_votes_are_rejected() {
        assert_eq!(
            PartyVoteRecord::checked("a", "A", -3, "d1"),
            Err(AllocationErrors::NegativeVotes {
                party: "a".to_string(),
                votes: -3
            })
        );
        assert_eq!(PartyVoteRecord::checked("a", "A", 3, "d1").unwrap().votes, 3);
    }

    #[test]
    fn island_allocation() {
        init_logger();
        let totals = vec![
            PartyTotal {
                name: "Blue".to_string(),
                votes: 1000,
                seats: None,
                bonus_seats: 0,
            },
            PartyTotal {
                name: "Red".to_string(),
                votes: 700,
                seats: None,
                bonus_seats: 0,
            },
            PartyTotal {
                name: "Green".to_string(),
                votes: 100,
                seats: None,
                bonus_seats: 0,
            },
            PartyTotal {
                name: "Yellow".to_string(),
                votes: 170,
                seats: None,
                bonus_seats: 0,
            },
            PartyTotal {
                name: "Grey".to_string(),
                votes: 30,
                seats: None,
                bonus_seats: 0,
            },
        ];
        let res = allocate_island(&totals, 2050, 50, 10, &AllocationRules::DEFAULT_RULES).unwrap();
        let got: Vec<(&str, u32)> = res
            .iter()
            .map(|r| (r.id.as_str(), r.total_seats))
            .collect();
        assert_eq!(
            got,
            vec![
                ("blue", 6),
                ("red", 3),
                ("green", 0),
                ("yellow", 1),
                ("grey", 0)
            ]
        );
    }
}
