use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("glide")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("glide")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("visit")
                .about(
                    "Start a navigation session against a dashboard host, run the requested \
                navigations and print a session report.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The starting URL (scheme-less hosts get http://)"),
                )
                .arg(
                    arg!(-l --"link" <HREF>)
                        .required(false)
                        .help("Href to navigate after the initial load (repeatable, in order)")
                        .action(clap::ArgAction::Append)
                        .conflicts_with("hrefs-file"),
                )
                .arg(
                    arg!(-H --"hrefs-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of hrefs to navigate in order")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("link"),
                )
                .arg(
                    arg!(-s --"section" <NAME>)
                        .required(false)
                        .help("Finish by loading /dashboard?section=<NAME> programmatically"),
                )
                .arg(
                    arg!(-t --"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print the recorded outcomes as JSON instead of the text report")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("check")
                .about("Classify one href against a base location without fetching anything")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The base location to resolve against")
                        .default_value("http://127.0.0.1"),
                )
                .arg(
                    arg!(-l --"link" <HREF>)
                        .required(true)
                        .help("The href to classify"),
                ),
        )
        .subcommand(
            command!("ui")
                .about("Open the interactive terminal browser on a starting location")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The starting URL"),
                ),
        )
}
