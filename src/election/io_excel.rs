// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use crate::election::{
    io_common::{make_default_id, parse_vote_count},
    *,
};

pub fn read_excel_votes(path: &str, cfs: &FileSource) -> ElectionResult<Vec<PartyConfig>> {
    let default_id = make_default_id(path);

    let first_row = cfs.first_data_row_index()?;
    let district_idx = cfs.district_column_index()?;
    let party_id_idx_o = cfs.party_id_column_index()?;
    let party_name_idx = cfs.party_name_column_index()?;
    let votes_idx = cfs.votes_column_index()?;

    let wrange = get_range(path, cfs)?;

    let mut res: Vec<PartyConfig> = Vec::new();
    for (idx, row) in wrange.rows().enumerate().skip(first_row) {
        let lineno = idx + 1;
        if row.iter().all(|c| matches!(c, DataType::Empty)) {
            debug!("read_excel_votes: skipping empty row {}", lineno);
            continue;
        }
        let id = match party_id_idx_o {
            Some(party_id_idx) => read_text(row, party_id_idx, lineno)?,
            None => default_id(lineno),
        };
        let party = PartyConfig {
            id,
            name: read_text(row, party_name_idx, lineno)?,
            district_id: read_text(row, district_idx, lineno)?,
            votes: read_count(row, votes_idx, lineno)?,
        };
        debug!("read_excel_votes: lineno: {:?} party: {:?}", lineno, &party);
        res.push(party);
    }
    Ok(res)
}

fn read_text(row: &[DataType], col: usize, lineno: usize) -> ElectionResult<String> {
    match row.get(col) {
        Some(DataType::String(s)) => Ok(s.trim().to_string()),
        Some(DataType::Int(i)) => Ok(i.to_string()),
        Some(DataType::Float(f)) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        Some(c) => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", c),
        }
        .fail(),
        None => RowTooShortSnafu { lineno }.fail(),
    }
}

// Spreadsheets store counts as floats.
fn read_count(row: &[DataType], col: usize, lineno: usize) -> ElectionResult<i64> {
    match row.get(col) {
        Some(DataType::Int(i)) => Ok(*i),
        Some(DataType::Float(f)) if f.fract() == 0.0 => Ok(*f as i64),
        Some(DataType::String(s)) => parse_vote_count(lineno, s),
        Some(c) => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", c),
        }
        .fail(),
        None => RowTooShortSnafu { lineno }.fail(),
    }
}

fn get_range(path: &str, cfs: &FileSource) -> ElectionResult<Range<DataType>> {
    debug!(
        "read_excel_votes: path: {:?} worksheet: {:?}",
        path, &cfs.excel_worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    match &cfs.excel_worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path }),
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path }),
    }
}
