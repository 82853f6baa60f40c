#[macro_use]
extern crate clap;

use asm65::{Assembler, FatalError};
use clap::Arg;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    // Parse command line arguments
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the source file to assemble")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Sets the object file to write to"),
        )
        .arg(
            Arg::with_name("listing")
                .short("l")
                .long("listing")
                .takes_value(true)
                .value_name("LISTING")
                .help("Sets the listing file to write to"),
        )
        .arg(
            Arg::with_name("export")
                .short("e")
                .long("export")
                .takes_value(true)
                .value_name("EXPORT")
                .help("Sets the symbol export file to write to"),
        )
        .get_matches();

    let input = PathBuf::from(matches.value_of("INPUT").unwrap());
    let output = matches.value_of("output").map(PathBuf::from);
    let listing = matches.value_of("listing").map(PathBuf::from);
    let export = matches.value_of("export").map(PathBuf::from);

    match assemble(&input, output, listing, export) {
        Ok(errors) => {
            if errors > 0 {
                println!("{} Error(s)", errors);
            } else {
                println!("No Errors");
            }
            process::exit(errors as i32);
        }
        Err(err) => {
            println!("Fatal Error -- {}", err);
            process::exit(-1);
        }
    }
}

fn assemble(
    input: &Path,
    output: Option<PathBuf>,
    listing: Option<PathBuf>,
    export: Option<PathBuf>,
) -> Result<u32, FatalError> {
    let result = Assembler::from_file(input).report_to_console(true).run()?;

    if let Some(path) = output {
        fs::write(&path, &result.binary).map_err(|_| FatalError::OutputOpen(path))?;
    }
    if let Some(path) = listing {
        fs::write(&path, result.listing.as_bytes()).map_err(|_| FatalError::ListingOpen(path))?;
    }
    if let Some(path) = export {
        fs::write(&path, result.export.as_bytes()).map_err(|_| FatalError::ExportOpen(path))?;
    }
    Ok(result.errors)
}
