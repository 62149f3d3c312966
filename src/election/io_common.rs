use std::path::Path;

use snafu::prelude::*;

use crate::election::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Identifiers for files without a party id column: file name and line number.
pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

pub fn parse_vote_count(lineno: usize, content: &str) -> ElectionResult<i64> {
    content
        .trim()
        .parse::<i64>()
        .ok()
        .context(ParsingVoteCountSnafu { lineno, content })
}
