use clap::Parser;

/// This program replays the tie-break widget of a results entry form.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON snapshot of the results form, with the optional list of changes to replay.
    /// The format is described in the manual of the tied_winner library.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path) A reference file containing the expected summary in JSON format. If provided, tiebreak will
    /// check that the summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the summary in JSON format. Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (number) If specified, overrides the winner count found in the data attributes of the form.
    #[clap(long, value_parser)]
    pub winner_count: Option<u32>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
