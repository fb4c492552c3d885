use crate::cli::Cli;
use crate::commands::{RunOptions, trim_roms};
use crate::json::ErrorJson;
use anyhow::Result;
use console::style;
use nds_trim_core::{ScanEngine, TrimConfig};
use std::process::ExitCode;

fn run_options(cli: &Cli) -> RunOptions {
    RunOptions {
        config: TrimConfig {
            paranoid: cli.paranoid || cli.ignore_header,
            ignore_header: cli.ignore_header,
            scan_engine: if cli.bisect {
                ScanEngine::Bisect
            } else {
                ScanEngine::Tail
            },
            header_field_offset: cli.header_offset,
        },
        ignore_extension: cli.ignore_extension,
        copy: cli.copy,
        jobs: cli.jobs,
        json: cli.json,
    }
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    let json = cli.json;
    let options = run_options(&cli);

    let result = trim_roms(cli.paths, &options);

    if let Err(e) = &result {
        if json {
            let causes: Vec<String> = e.chain().skip(1).map(|c| c.to_string()).collect();
            let payload = ErrorJson {
                status: "error",
                error: e.to_string(),
                causes,
            };
            println!("{}", serde_json::to_string(&payload)?);
        } else {
            eprintln!("\n{} {}", style("[ERROR]").red().bold(), style(&e).red());

            for (i, cause) in e.chain().skip(1).enumerate() {
                if i == 0 {
                    eprintln!("\n    Caused by:");
                }
                eprintln!("      - {}", style(cause).red());
            }
            eprintln!();
        }
    }

    result
}
