use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "skillscout",
    version,
    about = "terminal client for an assessment recommendation service",
    long_about = "Skillscout queries a recommendation service for assessments matching a free-text description and renders the ranked results.\n\nExamples:\n  skillscout \"java developer with sql\"\n  skillscout \"qa engineer\" -k 10 -b http://recommender.internal:8000\n  skillscout -o results.json\n\nTip: omit the query to start an interactive prompt."
)]
pub struct CliArgs {
    #[arg(
        value_name = "QUERY",
        help_heading = "Search",
        help = "Search query. Omit to start the interactive prompt."
    )]
    pub query: Option<String>,

    #[arg(
        short = 'k',
        long = "top-k",
        value_name = "N",
        help_heading = "Search",
        help = "How many results to request (unparseable or zero falls back to 7)."
    )]
    pub top_k: Option<String>,

    #[arg(
        short = 'b',
        long = "base-url",
        visible_alias = "url",
        value_name = "URL",
        help_heading = "HTTP",
        help = "Recommendation service base URL."
    )]
    pub base_url: Option<String>,

    #[arg(
        short = 'T',
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.skillscout/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the last result set to a file."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (text or json)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'n',
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,
}
