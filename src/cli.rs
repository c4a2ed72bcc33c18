use crate::{AbxError, AbxToXmlConverter, Result};
use clap::{Arg, ArgAction, Command};
use std::env;
use std::ffi::OsString;
use std::path::Path;

pub struct Cli;

impl Cli {
    pub fn build_command() -> Command {
        Command::new("abx2xml")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Converts Android Binary XML (ABX) to human-readable XML")
            .long_about(
                "Converts Android Binary XML (ABX) to human-readable XML.\n\n\
                 When invoked with the '-i' argument, the output of a successful conversion\n\
                 will overwrite the original input file. Input can be '-' to use stdin, and\n\
                 output can be '-' to use stdout. When the output argument is omitted, the\n\
                 result is written next to the input with its extension replaced by '.xml'.",
            )
            .arg(
                Arg::new("multi-root")
                    .long("mr")
                    .help("Enable multi-root processing (siblings under a synthetic root)")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("in-place")
                    .short('i')
                    .long("in-place")
                    .help("Overwrite input file with converted output")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("input")
                    .help("Input file path (use '-' for stdin)")
                    .required(true)
                    .index(1),
            )
            .arg(
                Arg::new("output")
                    .help("Output file path (use '-' for stdout)")
                    .index(2),
            )
    }

    pub fn run() -> Result<()> {
        let args = env::args_os().map(normalize_legacy_flag);
        let matches = Self::build_command().get_matches_from(args);
        Self::run_with_matches(matches)
    }

    pub fn run_with_matches(matches: clap::ArgMatches) -> Result<()> {
        let input_path = matches.get_one::<String>("input").unwrap();
        let in_place = matches.get_flag("in-place");
        let multi_root = matches.get_flag("multi-root");

        if in_place && input_path == "-" {
            return Err(AbxError::Usage(
                "Cannot use -i option with stdin input".to_string(),
            ));
        }

        let output_path = resolve_output_path(
            input_path,
            in_place,
            matches.get_one::<String>("output").map(String::as_str),
        );

        match (input_path.as_str(), output_path.as_str()) {
            ("-", "-") => AbxToXmlConverter::convert_stdin_stdout(multi_root)?,
            ("-", output) => AbxToXmlConverter::convert_stdin_to_file(output, multi_root)?,
            (input, "-") => AbxToXmlConverter::convert_file_to_stdout(input, multi_root)?,
            (input, output) => AbxToXmlConverter::convert_file(input, output, multi_root)?,
        }

        eprintln!(
            "Successfully converted {input_path} to {output_path}{}",
            if multi_root { " (multi-root mode)" } else { "" }
        );
        Ok(())
    }
}

/// Accept the two-letter `-mr` spelling, which clap cannot express as a
/// short flag, by rewriting it to `--mr`.
fn normalize_legacy_flag(arg: OsString) -> OsString {
    if arg == "-mr" { OsString::from("--mr") } else { arg }
}

/// Where the XML goes when the user did not say: in-place writes back to the
/// input, stdin input defaults to stdout, and files default to the input path
/// with its extension replaced by `.xml`.
fn resolve_output_path(input: &str, in_place: bool, output: Option<&str>) -> String {
    match output {
        Some(path) => path.to_owned(),
        None if in_place => input.to_owned(),
        None if input == "-" => "-".to_owned(),
        None => Path::new(input)
            .with_extension("xml")
            .to_string_lossy()
            .into_owned(),
    }
}
