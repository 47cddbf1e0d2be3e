use clap::{
    crate_description, crate_name, crate_version, value_parser, Arg, ArgAction, ArgMatches,
    Command,
};
use log::LevelFilter;
use miette::IntoDiagnostic;
use seed::{
    config::Config,
    logger::{ConsoleLogger, Logger},
    source::{Source, SystemClipboard},
    Format, Outcome, Request, Runner,
};
use std::path::PathBuf;

fn cli() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .arg(
            Arg::new("tree")
                .help("The tree to plant, as a box-drawing diagram or JSON")
                .value_name("TREE"),
        )
        .arg(
            Arg::new("clipboard")
                .short('c')
                .long("clipboard")
                .help("Use tree structure from clipboard")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("file")
                .short('F')
                .long("file")
                .help("Read the tree structure from a file")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Format of the tree structure")
                .value_parser(["tree", "json"]),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Read default settings from a TOML file")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print the parsed tree without creating anything")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Suppress all non-essential console output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
}

// The CLI layer should only parse inputs and forward them to library code.
fn main() -> miette::Result<()> {
    let matches = cli().get_matches();

    init_logging(matches.get_flag("verbose"));

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let silent = matches.get_flag("silent") || config.silent.unwrap_or(false);
    let logger = ConsoleLogger::new(silent);

    let request = build_request(&matches, &config)?;
    let mut runner = Runner::new(SystemClipboard, &logger);

    match runner.run(&request) {
        Ok(Outcome::NoSource) => cli().print_help().into_diagnostic(),
        Ok(Outcome::Previewed(root)) => {
            println!("{}", root.preview());
            logger.log(format_args!("{}", root.counts()));
            Ok(())
        }
        Ok(Outcome::Planted(created)) => {
            log::debug!("created {}", created);
            Ok(())
        }
        Err(error) => {
            logger.error(format_args!("Unable to plant the tree structure"));
            Err(error.into())
        }
    }
}

fn init_logging(is_verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();

    if is_verbose {
        builder.filter_level(LevelFilter::Debug);
    }

    builder.init();
}

fn build_request(matches: &ArgMatches, config: &Config) -> miette::Result<Request> {
    let format = match matches.get_one::<String>("format") {
        Some(value) => value.parse::<Format>()?,
        None => config.format.unwrap_or_default(),
    };

    let source = Source::select(
        matches.get_flag("clipboard"),
        matches.get_one::<PathBuf>("file").cloned(),
        matches.get_one::<String>("tree").cloned(),
    );

    Ok(Request {
        source,
        format,
        options: config.parse_options(),
        base: PathBuf::new(),
        dry_run: matches.get_flag("dry-run"),
    })
}
