pub use crate::config::*;

/// A builder for entering the votes of a district.
///
/// Vote counts are accepted as signed numbers, as they come from forms or
/// spreadsheets, and checked when they are added.
///
/// ```
/// pub use seat_allocation::builder::DistrictBuilder;
/// pub use seat_allocation::AllocationRules;
/// # use seat_allocation::AllocationErrors;
///
/// let mut builder = DistrictBuilder::new("colombo", &AllocationRules::DEFAULT_RULES)
///     .totals(1000, 0)?
///     .seats(5);
///
/// builder.add_party("a", "Anna's party", 600)?;
/// builder.add_party("b", "Bob's party", 400)?;
///
/// let results = builder.allocate()?;
/// assert_eq!(results.iter().map(|r| r.total_seats).sum::<u32>(), 5);
///
/// # Ok::<(), AllocationErrors>(())
/// ```
pub struct DistrictBuilder {
    pub(crate) _rules: AllocationRules,
    pub(crate) _summary: DistrictVoteSummary,
    pub(crate) _parties: Vec<PartyVoteRecord>,
}

impl DistrictBuilder {
    pub fn new(district_id: &str, rules: &AllocationRules) -> DistrictBuilder {
        DistrictBuilder {
            _rules: *rules,
            _summary: DistrictVoteSummary {
                district_id: district_id.to_string(),
                total_votes: 0,
                rejected_votes: 0,
                seat_count: 0,
            },
            _parties: Vec::new(),
        }
    }

    /// Sets the total and rejected votes of the district.
    pub fn totals(
        self,
        total_votes: i64,
        rejected_votes: i64,
    ) -> Result<DistrictBuilder, AllocationErrors> {
        let district = self._summary.district_id.clone();
        let total_votes = checked_count(&district, total_votes)?;
        let rejected_votes = checked_count(&district, rejected_votes)?;
        if rejected_votes > total_votes {
            return Err(AllocationErrors::RejectedExceedsTotal {
                district,
                total: total_votes,
                rejected: rejected_votes,
            });
        }
        Ok(DistrictBuilder {
            _summary: DistrictVoteSummary {
                total_votes,
                rejected_votes,
                ..self._summary
            },
            ..self
        })
    }

    pub fn seats(self, seat_count: u32) -> DistrictBuilder {
        DistrictBuilder {
            _summary: DistrictVoteSummary {
                seat_count,
                ..self._summary
            },
            ..self
        }
    }

    /// Adds a party running in this district.
    ///
    /// The identifier must be unique within the district.
    pub fn add_party(&mut self, id: &str, name: &str, votes: i64) -> Result<(), AllocationErrors> {
        if self._parties.iter().any(|p| p.id == id) {
            return Err(AllocationErrors::DuplicateParty {
                district: self._summary.district_id.clone(),
                party: id.to_string(),
            });
        }
        let record = PartyVoteRecord::checked(id, name, votes, &self._summary.district_id)?;
        self._parties.push(record);
        Ok(())
    }

    pub fn summary(&self) -> &DistrictVoteSummary {
        &self._summary
    }

    pub fn allocate(&self) -> Result<Vec<SeatAllocationResult>, AllocationErrors> {
        crate::allocate_district(&self._summary, &self._parties, &self._rules)
    }
}
