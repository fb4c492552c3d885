use clap::Parser;
use nds_trim_core::header::APPLICATION_END_OFFSET_FIELD;
use std::path::PathBuf;

use crate::util::parse_offset;

#[derive(Parser)]
#[command(
    name = "nds-trim",
    version,
    about = "Remove the padding from Nintendo DS ROM images",
    long_about = "Remove the trailing 0x00/0xFF padding from Nintendo DS ROM images in place.\n\n\
                  By default the header's application end offset decides where content ends. \
                  Paranoia mode also scans the image from its end."
)]
pub struct Cli {
    /// ROM images to trim (options and paths may be mixed)
    #[arg(value_name = "ROM", required = true)]
    pub paths: Vec<PathBuf>,

    /// Scan the image for padding when the header disagrees with the file size
    #[arg(short, long)]
    pub paranoid: bool,

    /// Do not read the header at all; implies --paranoid
    #[arg(short, long)]
    pub ignore_header: bool,

    /// Accept files that do not end in .nds
    #[arg(short = 'e', long)]
    pub ignore_extension: bool,

    /// Scan with a chunked binary search instead of reading backward from the end
    #[arg(short, long)]
    pub bisect: bool,

    /// Byte position of the end offset field in the header (decimal or 0x-prefixed)
    #[arg(
        long,
        value_name = "BYTES",
        default_value_t = APPLICATION_END_OFFSET_FIELD,
        value_parser = parse_offset
    )]
    pub header_offset: u64,

    /// Trim a copy named "<name> trim<N>.nds" and leave the original untouched
    #[arg(short, long)]
    pub copy: bool,

    /// Number of files trimmed in parallel (default: number of CPUs)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Output machine-readable JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long)]
    pub verbose: bool,
}
