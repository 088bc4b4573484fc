use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use campus_dashboard::{
    load_records, parse_bound, parse_filter, show, Course, DashboardConfig, Department,
    OutputFormat, Screen, ScreenConfig, ScreenQuery, Transaction,
};
use campus_query::{RecordSchema, SortSpec};
use clap::Parser;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Query the campus dashboard's tables from the command line.
#[derive(Debug, Parser)]
#[command(name = "campus", version, about)]
struct Cli {
    /// Table to show
    #[arg(value_enum)]
    screen: Screen,

    /// JSON file holding the screen's records
    #[arg(long, short, value_name = "FILE")]
    records: PathBuf,

    /// YAML or JSON file overriding the built-in screen settings
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Case-insensitive text to look for in the searchable columns
    #[arg(long, short)]
    search: Option<String>,

    /// Keep rows whose field is one of the values
    #[arg(long, short, value_name = "FIELD=V1,V2")]
    filter: Vec<String>,

    /// Lower bound of a number or date field, inclusive
    #[arg(long, value_name = "FIELD=VALUE")]
    min: Vec<String>,

    /// Upper bound of a number or date field, inclusive
    #[arg(long, value_name = "FIELD=VALUE")]
    max: Vec<String>,

    /// Order by a field, e.g. `amount:desc`
    #[arg(long, value_name = "FIELD[:asc|desc]")]
    sort: Option<SortSpec>,

    /// Page to show, starting at 1
    #[arg(long, short, default_value_t = 1)]
    page: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Log pipeline stages to stderr (same as RUST_LOG=debug)
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn controls(&self) -> Result<ScreenQuery> {
        let schema = self.screen.schema();
        let mut controls = ScreenQuery::new().page(self.page);

        if let Some(term) = &self.search {
            controls = controls.search(term.as_str());
        }
        for arg in &self.filter {
            let (field, values) = parse_filter(arg)?;
            controls = controls.filter(field, values);
        }
        for arg in &self.min {
            let (field, value) = parse_bound(&schema, arg)?;
            controls = controls.min(field, value);
        }
        for arg in &self.max {
            let (field, value) = parse_bound(&schema, arg)?;
            controls = controls.max(field, value);
        }
        if let Some(sort) = &self.sort {
            controls = controls.sort(sort.clone());
        }
        Ok(controls)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run<R>(cli: &Cli, config: &ScreenConfig, controls: &ScreenQuery) -> Result<String>
where
    R: RecordSchema + Serialize + DeserializeOwned,
{
    let records: Vec<R> = load_records(&cli.records)
        .with_context(|| format!("loading {} records", cli.screen))?;
    let styled = cli.format == OutputFormat::Table && console::colors_enabled();
    let out = show(cli.screen, config, &records, controls, cli.format, styled)?;
    Ok(out)
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    match path {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("loading config from '{}'", path.display())),
        None => Ok(DashboardConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let screen_config = config.screen(cli.screen);
    let controls = cli.controls()?;

    let out = match cli.screen {
        Screen::Finance => run::<Transaction>(&cli, screen_config, &controls),
        Screen::Courses => run::<Course>(&cli, screen_config, &controls),
        Screen::Departments => run::<Department>(&cli, screen_config, &controls),
    }
    .with_context(|| format!("showing the {} screen", cli.screen))?;

    print!("{}", out);
    Ok(())
}
