use clap::Parser;

/// This is a seat allocation program for district elections.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The file containing the election description in JSON format: provinces,
    /// districts, parties and vote files. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path) A reference file containing the summary of an election in JSON format. If
    /// provided, seatcalc will check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in
    /// JSON format to the given location. By default, it is printed on the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) An additional file with the votes of the parties, one row per party
    /// and per district: district, party id, party name, votes (with a header row).
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path or empty) If specified, the election with all the imported votes is saved
    /// to this location, in the same format as the configuration.
    #[clap(long, value_parser)]
    pub snapshot: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
