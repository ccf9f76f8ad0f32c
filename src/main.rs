#[macro_use]
extern crate clap;

use asm8080::error::{Error, IoContext};
use clap::Arg;
use std::fs::File;
use std::io::prelude::*;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the assembly source file to read")
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Sets the output stem; .tmp/.lst/.hex are derived from it"),
        )
        .get_matches();

    let input = match matches.value_of("INPUT") {
        Some(path) => path.to_owned(),
        None => prompt_for_filename(),
    };
    let output = matches.value_of("output");

    if let Err(err) = run(&input, output) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn prompt_for_filename() -> String {
    print!("Source file: ");
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin().read_line(&mut line).expect("failed to read a filename from stdin");
    line.trim().to_owned()
}

/// Resolves the stem as "characters before the first `.`" in the file name
/// (spec.md §6), not Rust's `Path::file_stem` (which strips only the last
/// extension), then appends `ext`.
fn derive_output_path(base: &Path, ext: &str) -> PathBuf {
    let file_name = base.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let stem = file_name.split('.').next().unwrap_or(file_name);
    base.with_file_name(format!("{}.{}", stem, ext))
}

fn run(input: &str, output: Option<&str>) -> Result<(), Error> {
    let input_path = Path::new(input);
    let source = std::fs::read_to_string(input_path)
        .map_err(|err| Error::Io(err, IoContext::ReadSource, input_path.to_owned()))?;

    let stem_base = match output {
        Some(path) => PathBuf::from(path),
        None => input_path.to_owned(),
    };
    let tmp_path = derive_output_path(&stem_base, "tmp");
    let lst_path = derive_output_path(&stem_base, "lst");
    let hex_path = derive_output_path(&stem_base, "hex");

    let assembly = asm8080::assemble(&source);

    write_lines(&tmp_path, &assembly.provisional_listing(), IoContext::WriteProvisionalListing)?;
    write_lines(&lst_path, &assembly.final_listing(), IoContext::WriteFinalListing)?;

    if let Some(hex_lines) = assembly.hex() {
        write_lines(&hex_path, &hex_lines, IoContext::WriteHex)?;
    }

    println!("Assembled Lines = {}, Errors = {}", assembly.assembled_lines(), assembly.error_count);
    Ok(())
}

fn write_lines(path: &Path, lines: &[String], context: IoContext) -> Result<(), Error> {
    let file = File::create(path).map_err(|err| Error::Io(err, context, path.to_owned()))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line).map_err(|err| Error::Io(err, context, path.to_owned()))?;
    }
    Ok(())
}
