// Primitives for reading CSV files.

use log::debug;
use snafu::prelude::*;

use crate::election::{
    io_common::{make_default_id, parse_vote_count},
    *,
};

pub fn read_csv_votes(path: &str, cfs: &FileSource) -> ElectionResult<Vec<PartyConfig>> {
    let default_id = make_default_id(path);

    let first_row = cfs.first_data_row_index()?;
    let district_idx = cfs.district_column_index()?;
    let party_id_idx_o = cfs.party_id_column_index()?;
    let party_name_idx = cfs.party_name_column_index()?;
    let votes_idx = cfs.votes_column_index()?;

    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut res: Vec<PartyConfig> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate().skip(first_row) {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu {})?;
        if line.iter().all(|s| s.trim().is_empty()) {
            debug!("read_csv_votes: skipping empty line {}", lineno);
            continue;
        }
        let id = match party_id_idx_o {
            Some(party_id_idx) => get_cell(&line, party_id_idx, lineno)?.to_string(),
            None => default_id(lineno),
        };
        let party = PartyConfig {
            id,
            name: get_cell(&line, party_name_idx, lineno)?.to_string(),
            district_id: get_cell(&line, district_idx, lineno)?.to_string(),
            votes: parse_vote_count(lineno, get_cell(&line, votes_idx, lineno)?)?,
        };
        debug!("read_csv_votes: lineno: {:?} party: {:?}", lineno, &party);
        res.push(party);
    }
    Ok(res)
}

fn get_cell(line: &csv::StringRecord, col: usize, lineno: usize) -> ElectionResult<&str> {
    line.get(col)
        .map(|s| s.trim())
        .context(RowTooShortSnafu { lineno })
}
