use anyhow::{Context, Result};
use clap::{App, AppSettings, Arg, SubCommand};
use folio::build::{build_site, load_posts};
use folio::config::Config;
use folio::post::DATE_FORMAT;
use folio::search::SearchIndex;
use log::error;
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let matches = App::new("folio")
        .about("Builds a paginated static blog from Markdown posts")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the site")
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .value_name("DIR")
                        .help("The output directory (default: ./_site)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("search")
                .about("Lists the posts whose title or body contains QUERY")
                .arg(Arg::with_name("QUERY").required(true).multiple(true)),
        )
        .get_matches();

    let cwd = std::env::current_dir().context("Getting the working directory")?;
    match matches.subcommand() {
        ("build", Some(build)) => {
            let output = match build.value_of("output") {
                Some(output) => PathBuf::from(output),
                None => cwd.join("_site"),
            };
            build_site(&Config::from_directory(&cwd, &output)?)?;
        }
        ("search", Some(search)) => {
            let query = search
                .values_of("QUERY")
                .map(|words| words.collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            let catalog = load_posts(&Config::from_directory(&cwd, &cwd.join("_site"))?)?;
            for post in catalog.search(&query)? {
                println!(
                    "{}  {}  {}",
                    post.created.format(DATE_FORMAT),
                    post.title,
                    post.url
                );
            }
        }
        _ => unreachable!("clap requires a subcommand"),
    }
    Ok(())
}
