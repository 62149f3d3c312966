// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The votes obtained by one party in one district.
///
/// The identifier is only unique within a district: the same party running
/// in several districts has one record (and usually one id) per district.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct PartyVoteRecord {
    pub id: String,
    pub name: String,
    pub votes: u64,
    pub district_id: String,
}

impl PartyVoteRecord {
    /// Builds a record from a signed vote count, as entered by an administrator
    /// or read from a file. Negative counts are rejected.
    pub fn checked(
        id: &str,
        name: &str,
        votes: i64,
        district_id: &str,
    ) -> Result<PartyVoteRecord, AllocationErrors> {
        Ok(PartyVoteRecord {
            id: id.to_string(),
            name: name.to_string(),
            votes: checked_count(id, votes)?,
            district_id: district_id.to_string(),
        })
    }
}

/// The totals of a district, as reported on the tally sheet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DistrictVoteSummary {
    pub district_id: String,
    pub total_votes: u64,
    pub rejected_votes: u64,
    pub seat_count: u32,
}

impl DistrictVoteSummary {
    pub fn valid_votes(&self) -> u64 {
        self.total_votes.saturating_sub(self.rejected_votes)
    }
}

// ******** Output data structures *********

/// The outcome of the allocation for one party.
#[derive(PartialEq, Debug, Clone)]
pub struct SeatAllocationResult {
    pub id: String,
    pub name: String,
    pub votes: u64,
    /// Share of the valid votes, between 0 and 100.
    pub percentage: f64,
    pub qualified: bool,
    pub bonus_seat: bool,
    /// Seats obtained by absorbing whole quotas of votes.
    pub first_round_seats: u32,
    /// Seats obtained from the remainders.
    pub second_round_seats: u32,
    pub total_seats: u32,
}

impl SeatAllocationResult {
    /// A record without any seat.
    pub fn unallocated(record: &PartyVoteRecord, percentage: f64) -> SeatAllocationResult {
        SeatAllocationResult {
            id: record.id.clone(),
            name: record.name.clone(),
            votes: record.votes,
            percentage,
            qualified: false,
            bonus_seat: false,
            first_round_seats: 0,
            second_round_seats: 0,
            total_seats: 0,
        }
    }
}

/// Votes and seats of one party, merged over several districts.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PartyTotal {
    pub name: String,
    pub votes: u64,
    /// Only filled when merging results that already carry seats.
    pub seats: Option<u64>,
    pub bonus_seats: u32,
}

/// Errors raised by the validated entry points.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AllocationErrors {
    NegativeVotes {
        party: String,
        votes: i64,
    },
    RejectedExceedsTotal {
        district: String,
        total: u64,
        rejected: u64,
    },
    DuplicateParty {
        district: String,
        party: String,
    },
    ForeignParty {
        district: String,
        party: String,
    },
}

impl Error for AllocationErrors {}

impl Display for AllocationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationErrors::NegativeVotes { party, votes } => {
                write!(f, "party {} has a negative vote count: {}", party, votes)
            }
            AllocationErrors::RejectedExceedsTotal {
                district,
                total,
                rejected,
            } => write!(
                f,
                "district {}: {} rejected votes out of {} total votes",
                district, rejected, total
            ),
            AllocationErrors::DuplicateParty { district, party } => {
                write!(f, "district {}: party {} appears twice", district, party)
            }
            AllocationErrors::ForeignParty { district, party } => write!(
                f,
                "party {} does not belong to district {}",
                party, district
            ),
        }
    }
}

/// Converts a signed count coming from the outside world.
pub fn checked_count(label: &str, count: i64) -> Result<u64, AllocationErrors> {
    u64::try_from(count).map_err(|_| AllocationErrors::NegativeVotes {
        party: label.to_string(),
        votes: count,
    })
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct AllocationRules {
    /// A party must get strictly more than this percentage of the total
    /// (not valid) votes of the district to take part in the allocation.
    pub threshold_percent: u32,
    /// Whether the leading parties receive a bonus seat.
    pub bonus_seat: bool,
}

impl AllocationRules {
    pub const DEFAULT_RULES: AllocationRules = AllocationRules {
        threshold_percent: 5,
        bonus_seat: true,
    };

    /// The number of votes a party has to exceed, as a display value.
    pub fn threshold(&self, total_votes: u64) -> f64 {
        total_votes as f64 * self.threshold_percent as f64 / 100.0
    }

    /// Exact integer form of `votes > total_votes * threshold_percent / 100`.
    pub fn qualifies(&self, votes: u64, total_votes: u64) -> bool {
        (votes as u128) * 100 > (total_votes as u128) * (self.threshold_percent as u128)
    }
}

impl Default for AllocationRules {
    fn default() -> Self {
        AllocationRules::DEFAULT_RULES
    }
}
