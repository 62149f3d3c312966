use crate::election::*;

use seat_allocation::{checked_count, AllocationErrors, DistrictVoteSummary, PartyVoteRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::fs;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "electionName")]
    pub election_name: String,
    #[serde(rename = "electionDate")]
    pub election_date: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub election: String,
    pub date: Option<String>,
    #[serde(rename = "thresholdPercent")]
    pub threshold_percent: String,
    #[serde(rename = "bonusSeat")]
    pub bonus_seat: bool,
    #[serde(rename = "islandSeats")]
    pub island_seats: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(rename = "thresholdPercent")]
    pub threshold_percent: Option<u32>,
    #[serde(rename = "bonusSeat")]
    pub bonus_seat: Option<bool>,
    #[serde(rename = "islandSeats")]
    pub island_seats: Option<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ProvinceConfig {
    pub id: String,
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DistrictConfig {
    pub id: String,
    pub name: String,
    #[serde(rename = "provinceId")]
    pub province_id: Option<String>,
    #[serde(rename = "seatCount")]
    pub seat_count: u32,
    #[serde(rename = "totalVotes")]
    pub total_votes: i64,
    #[serde(rename = "rejectedVotes")]
    pub rejected_votes: Option<i64>,
}

impl DistrictConfig {
    pub fn vote_summary(&self) -> Result<DistrictVoteSummary, AllocationErrors> {
        Ok(DistrictVoteSummary {
            district_id: self.id.clone(),
            total_votes: checked_count(&self.id, self.total_votes)?,
            rejected_votes: checked_count(&self.id, self.rejected_votes.unwrap_or(0))?,
            seat_count: self.seat_count,
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PartyConfig {
    pub id: String,
    pub name: String,
    #[serde(rename = "districtId")]
    pub district_id: String,
    pub votes: i64,
}

impl PartyConfig {
    pub fn vote_record(&self) -> Result<PartyVoteRecord, AllocationErrors> {
        PartyVoteRecord::checked(&self.id, self.name.trim(), self.votes, &self.district_id)
    }
}

/// A file with one row per party and per district.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstDataRowIndex")]
    _first_data_row_index: Option<JSValue>,
    #[serde(rename = "districtColumnIndex")]
    _district_column_index: JSValue,
    #[serde(rename = "partyIdColumnIndex")]
    _party_id_column_index: Option<JSValue>,
    #[serde(rename = "partyNameColumnIndex")]
    _party_name_column_index: JSValue,
    #[serde(rename = "votesColumnIndex")]
    _votes_column_index: JSValue,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    /// district, party id, party name, votes, after one header row.
    pub fn with_default_layout(
        provider: &str,
        file_path: &str,
        excel_worksheet_name: Option<String>,
    ) -> FileSource {
        FileSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            _first_data_row_index: None,
            _district_column_index: JSValue::from(1),
            _party_id_column_index: Some(JSValue::from(2)),
            _party_name_column_index: JSValue::from(3),
            _votes_column_index: JSValue::from(4),
            excel_worksheet_name,
        }
    }

    /// The 0-based index of the first row to read.
    pub fn first_data_row_index(&self) -> ElectionResult<usize> {
        match &self._first_data_row_index {
            None => Ok(1),
            Some(x) => Ok(read_js_int(x)? - 1),
        }
    }

    pub fn district_column_index(&self) -> ElectionResult<usize> {
        Ok(read_js_int(&self._district_column_index)? - 1)
    }

    pub fn party_id_column_index(&self) -> ElectionResult<Option<usize>> {
        match &self._party_id_column_index {
            None => Ok(None),
            Some(x) => Ok(Some(read_js_int(x)? - 1)),
        }
    }

    pub fn party_name_column_index(&self) -> ElectionResult<usize> {
        Ok(read_js_int(&self._party_name_column_index)? - 1)
    }

    pub fn votes_column_index(&self) -> ElectionResult<usize> {
        Ok(read_js_int(&self._votes_column_index)? - 1)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub rules: Option<RulesConfig>,
    #[serde(default)]
    pub provinces: Vec<ProvinceConfig>,
    pub districts: Vec<DistrictConfig>,
    #[serde(default)]
    pub parties: Vec<PartyConfig>,
    #[serde(rename = "voteFileSources", default)]
    pub vote_file_sources: Vec<FileSource>,
}

pub fn read_summary(path: &str) -> ElectionResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

// 1-based index, as a number, a string of digits or spreadsheet letters.
fn read_js_int(x: &JSValue) -> ElectionResult<usize> {
    let res = match x {
        JSValue::Number(n) => n.as_u64().map(|x| x as usize),
        JSValue::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            s.to_ascii_lowercase().chars().try_fold(0usize, |acc, c| {
                acc.checked_mul(26)?
                    .checked_add((c as usize) - ('a' as usize) + 1)
            })
        }
        JSValue::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    res.filter(|x| *x >= 1).context(ParsingJsonNumberSnafu {})
}
