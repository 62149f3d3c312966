use log::{debug, info, warn};

use seat_allocation::color::ColorAssigner;
use seat_allocation::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::election::config_reader::*;
use crate::election::store::{ElectionStore, JsonFileStore};

mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod store;

#[derive(Debug, Snafu)]
pub enum ElectionError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Line {lineno}: unexpected cell {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive column or row index (number or letters)"))]
    ParsingJsonNumber {},
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno} is too short"))]
    RowTooShort { lineno: usize },
    #[snafu(display("Line {lineno}: cannot read the vote count {content:?}"))]
    ParsingVoteCount { lineno: usize, content: String },
    #[snafu(display("Unknown vote file provider {provider}"))]
    UnknownProvider { provider: String },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Party {party} refers to the unknown district {district}"))]
    UnknownDistrict { party: String, district: String },
    #[snafu(display("District {district} is defined more than once"))]
    DuplicateDistrict { district: String },
    #[snafu(display("Invalid votes in district {district}: {source}"))]
    Allocation {
        source: AllocationErrors,
        district: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ElectionResult<T> = Result<T, ElectionError>;

/// Options coming from the command line.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunOptions {
    pub reference: Option<String>,
    pub out: Option<String>,
    pub input: Option<String>,
    pub input_type: Option<String>,
    pub excel_worksheet_name: Option<String>,
    pub snapshot: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ElectionRules {
    pub allocation: AllocationRules,
    pub island_seats: Option<u32>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct DistrictOutcome {
    pub district: DistrictConfig,
    pub summary: DistrictVoteSummary,
    pub results: Vec<SeatAllocationResult>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ProvinceOutcome {
    pub province: ProvinceConfig,
    pub seats: u64,
    pub total_votes: u64,
    pub rejected_votes: u64,
    pub parties: Vec<PartyTotal>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct IslandOutcome {
    pub seats: u64,
    pub total_votes: u64,
    pub rejected_votes: u64,
    pub parties: Vec<PartyTotal>,
    pub allocation: Option<Vec<SeatAllocationResult>>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ElectionOutcome {
    pub districts: Vec<DistrictOutcome>,
    pub provinces: Vec<ProvinceOutcome>,
    pub island: IslandOutcome,
}

fn validate_rules(rules: &Option<RulesConfig>) -> ElectionResult<ElectionRules> {
    let defaults = AllocationRules::DEFAULT_RULES;
    let rc = match rules {
        Some(rc) => rc.clone(),
        None => {
            return Ok(ElectionRules {
                allocation: defaults,
                island_seats: None,
            })
        }
    };
    let threshold_percent = rc.threshold_percent.unwrap_or(defaults.threshold_percent);
    if threshold_percent > 100 {
        whatever!(
            "thresholdPercent must be between 0 and 100, got {}",
            threshold_percent
        )
    }
    Ok(ElectionRules {
        allocation: AllocationRules {
            threshold_percent,
            bonus_seat: rc.bonus_seat.unwrap_or(defaults.bonus_seat),
        },
        island_seats: rc.island_seats,
    })
}

/// Runs the allocation for every district, then merges the results by province
/// and for the whole island.
pub fn tabulate(config: &ElectionConfig, rules: &ElectionRules) -> ElectionResult<ElectionOutcome> {
    let mut district_ids: HashSet<&str> = HashSet::new();
    for d in config.districts.iter() {
        ensure!(
            district_ids.insert(d.id.as_str()),
            DuplicateDistrictSnafu { district: &d.id }
        );
    }
    for p in config.parties.iter() {
        ensure!(
            district_ids.contains(p.district_id.as_str()),
            UnknownDistrictSnafu {
                party: &p.id,
                district: &p.district_id
            }
        );
    }

    let mut districts: Vec<DistrictOutcome> = Vec::new();
    let mut all_records: Vec<PartyVoteRecord> = Vec::new();
    for d in config.districts.iter() {
        let summary = d
            .vote_summary()
            .context(AllocationSnafu { district: &d.id })?;
        let records: Vec<PartyVoteRecord> = config
            .parties
            .iter()
            .filter(|p| p.district_id == d.id)
            .map(|p| p.vote_record())
            .collect::<Result<_, _>>()
            .context(AllocationSnafu { district: &d.id })?;
        info!(
            "District {} ({}): {} parties, {} seats",
            d.id,
            d.name,
            records.len(),
            summary.seat_count
        );
        let results = allocate_district(&summary, &records, &rules.allocation)
            .context(AllocationSnafu { district: &d.id })?;
        all_records.extend(records);
        districts.push(DistrictOutcome {
            district: d.clone(),
            summary,
            results,
        });
    }

    let province_ids: HashSet<&str> = config.provinces.iter().map(|p| p.id.as_str()).collect();
    for d in config.districts.iter() {
        match &d.province_id {
            Some(pid) if !province_ids.contains(pid.as_str()) => {
                warn!(
                    "District {} refers to the unknown province {}, it will only count island-wide",
                    d.id, pid
                );
            }
            _ => {}
        }
    }

    let provinces: Vec<ProvinceOutcome> = config
        .provinces
        .iter()
        .map(|p| {
            let members: Vec<&DistrictOutcome> = districts
                .iter()
                .filter(|d| d.district.province_id.as_deref() == Some(p.id.as_str()))
                .collect();
            let results: Vec<SeatAllocationResult> = members
                .iter()
                .flat_map(|d| d.results.iter().cloned())
                .collect();
            ProvinceOutcome {
                province: p.clone(),
                seats: members.iter().map(|d| d.summary.seat_count as u64).sum(),
                total_votes: members.iter().map(|d| d.summary.total_votes).sum(),
                rejected_votes: members.iter().map(|d| d.summary.rejected_votes).sum(),
                parties: aggregate_results(&results),
            }
        })
        .collect();

    let island = island_outcome(&districts, &all_records, rules)?;

    Ok(ElectionOutcome {
        districts,
        provinces,
        island,
    })
}

fn island_outcome(
    districts: &[DistrictOutcome],
    all_records: &[PartyVoteRecord],
    rules: &ElectionRules,
) -> ElectionResult<IslandOutcome> {
    let all_results: Vec<SeatAllocationResult> = districts
        .iter()
        .flat_map(|d| d.results.iter().cloned())
        .collect();
    let total_votes: u64 = districts.iter().map(|d| d.summary.total_votes).sum();
    let rejected_votes: u64 = districts.iter().map(|d| d.summary.rejected_votes).sum();

    let allocation = match rules.island_seats {
        Some(seats) => {
            let totals = aggregate_votes(all_records);
            debug!("island_outcome: totals: {:?}", totals);
            let res = allocate_island(
                &totals,
                total_votes,
                rejected_votes,
                seats,
                &rules.allocation,
            )
            .context(AllocationSnafu {
                district: ISLAND_DISTRICT,
            })?;
            Some(res)
        }
        None => None,
    };

    Ok(IslandOutcome {
        seats: districts.iter().map(|d| d.summary.seat_count as u64).sum(),
        total_votes,
        rejected_votes,
        parties: aggregate_results(&all_results),
        allocation,
    })
}

// Display order: votes first.
fn sorted_results(results: &[SeatAllocationResult]) -> Vec<SeatAllocationResult> {
    let mut res = results.to_vec();
    res.sort_by(|a, b| b.votes.cmp(&a.votes).then_with(|| a.id.cmp(&b.id)));
    res
}

fn sorted_totals(totals: &[PartyTotal]) -> Vec<PartyTotal> {
    let mut res = totals.to_vec();
    res.sort_by(|a, b| {
        b.votes
            .cmp(&a.votes)
            .then_with(|| party_key(&a.name).cmp(&party_key(&b.name)))
    });
    res
}

fn results_to_json(results: &[SeatAllocationResult], colors: &mut ColorAssigner) -> Vec<JSValue> {
    sorted_results(results)
        .iter()
        .map(|r| {
            json!({
                "party": r.id,
                "name": r.name,
                "votes": r.votes.to_string(),
                "percentage": format!("{:.1}", r.percentage),
                "qualified": r.qualified,
                "bonusSeat": r.bonus_seat,
                "firstRound": r.first_round_seats.to_string(),
                "secondRound": r.second_round_seats.to_string(),
                "seats": r.total_seats.to_string(),
                "color": colors.color_for(&r.name),
            })
        })
        .collect()
}

fn totals_to_json(totals: &[PartyTotal], valid_votes: u64, colors: &mut ColorAssigner) -> Vec<JSValue> {
    sorted_totals(totals)
        .iter()
        .map(|pt| {
            json!({
                "name": pt.name,
                "votes": pt.votes.to_string(),
                "percentage": format!("{:.1}", percentage(pt.votes, valid_votes)),
                "seats": pt.seats.unwrap_or(0).to_string(),
                "bonusSeats": pt.bonus_seats.to_string(),
                "color": colors.color_for(&pt.name),
            })
        })
        .collect()
}

fn build_summary_js(
    config: &ElectionConfig,
    rules: &ElectionRules,
    outcome: &ElectionOutcome,
) -> JSValue {
    let c = OutputConfig {
        election: config.output_settings.election_name.clone(),
        date: config.output_settings.election_date.clone(),
        threshold_percent: rules.allocation.threshold_percent.to_string(),
        bonus_seat: rules.allocation.bonus_seat,
        island_seats: rules.island_seats.map(|s| s.to_string()),
    };

    // The biggest parties island-wide get the first colours.
    let mut colors = ColorAssigner::new();
    for pt in sorted_totals(&outcome.island.parties).iter() {
        colors.color_for(&pt.name);
    }

    let districts: Vec<JSValue> = outcome
        .districts
        .iter()
        .map(|d| {
            json!({
                "district": d.district.id,
                "name": d.district.name,
                "province": d.district.province_id,
                "seats": d.summary.seat_count.to_string(),
                "totalVotes": d.summary.total_votes.to_string(),
                "rejectedVotes": d.summary.rejected_votes.to_string(),
                "validVotes": d.summary.valid_votes().to_string(),
                "threshold": format!("{:.2}", rules.allocation.threshold(d.summary.total_votes)),
                "results": results_to_json(&d.results, &mut colors),
            })
        })
        .collect();

    let provinces: Vec<JSValue> = outcome
        .provinces
        .iter()
        .map(|p| {
            let valid_votes = p.total_votes.saturating_sub(p.rejected_votes);
            json!({
                "province": p.province.id,
                "name": p.province.name,
                "seats": p.seats.to_string(),
                "totalVotes": p.total_votes.to_string(),
                "rejectedVotes": p.rejected_votes.to_string(),
                "validVotes": valid_votes.to_string(),
                "parties": totals_to_json(&p.parties, valid_votes, &mut colors),
            })
        })
        .collect();

    let island = &outcome.island;
    let island_valid_votes = island.total_votes.saturating_sub(island.rejected_votes);
    let allocation: Option<Vec<JSValue>> = island
        .allocation
        .as_ref()
        .map(|res| results_to_json(res, &mut colors));
    let island_js = json!({
        "seats": island.seats.to_string(),
        "totalVotes": island.total_votes.to_string(),
        "rejectedVotes": island.rejected_votes.to_string(),
        "validVotes": island_valid_votes.to_string(),
        "threshold": format!("{:.2}", rules.allocation.threshold(island.total_votes)),
        "parties": totals_to_json(&island.parties, island_valid_votes, &mut colors),
        "allocation": allocation,
    });

    json!({
        "config": c,
        "districts": districts,
        "provinces": provinces,
        "island": island_js,
    })
}

fn read_vote_data(root_path: &Path, cfs: &FileSource) -> ElectionResult<Vec<PartyConfig>> {
    let p = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read vote file {:?}", p2);
    let parties = match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_votes(&p2, cfs)?,
        "xlsx" | "excel" => io_excel::read_excel_votes(&p2, cfs)?,
        x => {
            return UnknownProviderSnafu { provider: x }.fail();
        }
    };
    info!("Read {} party results from {:?}", parties.len(), p2);
    Ok(parties)
}

pub fn run_election(config_path: String, options: &RunOptions) -> ElectionResult<()> {
    let store = JsonFileStore::new(&config_path);
    let mut config = store.load()?;
    info!("config: {:?}", config);

    let rules = validate_rules(&config.rules)?;
    if config.districts.is_empty() {
        whatever!("No district defined in {}", config_path)
    }

    let root_p = Path::new(config_path.as_str())
        .parent()
        .context(MissingParentDirSnafu {})?;
    for cfs in config.vote_file_sources.clone().iter() {
        let mut parties = read_vote_data(root_p, cfs)?;
        config.parties.append(&mut parties);
    }
    if let Some(input) = &options.input {
        let cfs = FileSource::with_default_layout(
            options.input_type.as_deref().unwrap_or("csv"),
            input,
            options.excel_worksheet_name.clone(),
        );
        let mut parties = read_vote_data(Path::new("."), &cfs)?;
        config.parties.append(&mut parties);
    }

    if let Some(snapshot_path) = &options.snapshot {
        // The imported votes are now part of the parties.
        let mut snapshot = config.clone();
        snapshot.vote_file_sources.clear();
        JsonFileStore::new(snapshot_path).save(&snapshot)?;
        info!("Saved the election to {:?}", snapshot_path);
    }

    let outcome = tabulate(&config, &rules)?;
    debug!("outcome: {:?}", outcome);

    let result_js = build_summary_js(&config, &rules, &outcome);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match options.out.as_deref() {
        None | Some("stdout") => println!("{}", pretty_js_stats),
        Some(out_path) => {
            fs::write(out_path, &pretty_js_stats).context(WritingJsonSnafu { path: out_path })?;
            info!("Summary written to {:?}", out_path);
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &options.reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
        info!("The summary matches the reference {:?}", summary_p);
    }

    Ok(())
}
