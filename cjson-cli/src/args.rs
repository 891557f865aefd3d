use std::path::PathBuf;

use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "cjson", about = "Read a JSON document and print or minify it")]
pub struct Args {
    /// Path to the JSON file to round-trip.
    pub path: PathBuf,

    /// Pretty-print instead of compact output.
    #[structopt(long)]
    pub pretty: bool,

    /// Minify a copy of the input (stripping whitespace and comments)
    /// and print it instead of the parsed-and-reprinted form.
    #[structopt(long)]
    pub minify: bool,
}
