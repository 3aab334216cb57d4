use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gridwatch::{
    aggregate::Series,
    config::SourceConfig,
    fetch::{self, Alert, FileSource, HttpSource, TextSource},
    record::fields,
    report::{CompareView, DashboardView, DevelopersView, ProjectsView, DEFAULT_PER_PAGE},
    Config, DatasetKind, ProjectFilter, Record,
};
use reqwest::Client;
use serde::Serialize;
use std::{io, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[derive(Parser)]
#[command(name = "gridwatch")]
#[command(about = "Aggregates ETIM and IIG project datasets into chart-ready series")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Read the CSV files from this directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Fetch the CSV files from this base URL
    #[arg(long, global = true, conflicts_with = "data_dir")]
    base_url: Option<Url>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline numbers and charts for one dataset
    Dashboard {
        #[arg(long, value_enum, default_value = "etim")]
        dataset: DatasetArg,

        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Developer rollup across both datasets
    Developers {
        /// Case-insensitive name filter
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only developers on the priority list
        #[arg(long)]
        high_priority: bool,

        #[arg(long, default_value_t = 8)]
        limit: usize,

        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Filtered, paginated project table for one dataset
    Projects {
        #[arg(long, value_enum, default_value = "etim")]
        dataset: DatasetArg,

        /// Exact state name
        #[arg(long, default_value = "")]
        state: String,

        /// Exact status
        #[arg(long, default_value = "")]
        status: String,

        /// Case-insensitive match on project name or developer
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only projects by priority developers
        #[arg(long)]
        high_priority: bool,

        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,

        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// ETIM vs IIG side by side
    Compare {
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Write the default configuration file
    InitConfig {
        #[arg(short, long, default_value = "gridwatch.toml")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum DatasetArg {
    Etim,
    Iig,
}

impl From<DatasetArg> for DatasetKind {
    fn from(arg: DatasetArg) -> Self {
        match arg {
            DatasetArg::Etim => DatasetKind::Etim,
            DatasetArg::Iig => DatasetKind::Iig,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum Format {
    Json,
    Csv,
    Text,
}

/// Load failures are shown on stderr, outside the report.
struct StderrAlert;

impl Alert for StderrAlert {
    fn alert(&self, message: &str) {
        eprintln!("error: {}", message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // ─── 2) configuration ────────────────────────────────────────────
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(root) = cli.data_dir {
        config.source = SourceConfig::Files { root };
    }
    if let Some(base_url) = cli.base_url {
        config.source = SourceConfig::Http { base_url };
    }

    if let Commands::InitConfig { output } = &cli.command {
        config.save(output)?;
        info!(path = %output.display(), "wrote configuration");
        return Ok(());
    }

    // ─── 3) load datasets ────────────────────────────────────────────
    let source: Box<dyn TextSource> = match &config.source {
        SourceConfig::Http { base_url } => {
            Box::new(HttpSource::new(Client::new(), base_url.clone()))
        }
        SourceConfig::Files { root } => Box::new(FileSource::new(root)),
    };
    let report = fetch::load_datasets(source.as_ref(), &config.load_options(), &StderrAlert).await;
    info!(etim = ?report.etim, iig = ?report.iig, "datasets ready");
    let data = &report.datasets;

    // ─── 4) render ───────────────────────────────────────────────────
    match cli.command {
        Commands::Dashboard { dataset, format } => {
            let view = DashboardView::build(data, dataset.into(), &config.top);
            match format {
                Format::Json => print_json(&view)?,
                Format::Csv => print_series_csv(&view.series())?,
                Format::Text => {
                    let s = &view.summary;
                    println!("{} dataset - {}", s.dataset, view.description);
                    println!("  projects:          {}", s.total_projects);
                    println!("  total value (USD): {:.2}M", s.total_value);
                    println!("  large (>500M):     {}", s.large_projects);
                    println!("  developers:        {}", s.unique_developers);
                    print_series_text(&view.series());
                }
            }
        }
        Commands::Developers {
            search,
            high_priority,
            limit,
            format,
        } => {
            let view = DevelopersView::build(data, &search, high_priority, limit);
            match format {
                Format::Json => print_json(&view)?,
                Format::Csv => print_developers_csv(&view)?,
                Format::Text => {
                    println!("{} developers match", view.total);
                    for d in &view.developers {
                        println!(
                            "{}{} ({} projects, {:.2}M) states: {}",
                            if d.high_priority { "* " } else { "  " },
                            d.display_name,
                            d.stats.project_count,
                            d.stats.total_value,
                            d.stats.states.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
                        );
                    }
                }
            }
        }
        Commands::Projects {
            dataset,
            state,
            status,
            search,
            high_priority,
            page,
            per_page,
            format,
        } => {
            let kind: DatasetKind = dataset.into();
            let filter = ProjectFilter {
                state,
                status,
                search,
                high_priority_only: high_priority,
            };
            let view = ProjectsView::build(data, kind, &filter, page.saturating_sub(1), per_page);
            match format {
                Format::Json => print_json(&view)?,
                Format::Csv => print_projects_csv(&view.projects)?,
                Format::Text => {
                    println!(
                        "{} projects match (page {} of {})",
                        view.total,
                        view.page + 1,
                        view.page_count().max(1)
                    );
                    for p in &view.projects {
                        println!(
                            "  {} | {} | {} | {}",
                            p.first_text(&[fields::ETIM_PROJECT, fields::IIG_PROJECT]).unwrap_or_default(),
                            p.first_text(kind.developer_fields()).unwrap_or_default(),
                            p.text(fields::STATE),
                            p.text(kind.value_field()),
                        );
                    }
                }
            }
        }
        Commands::Compare { format } => {
            let view = CompareView::build(data, &config.top);
            match format {
                Format::Json => print_json(&view)?,
                Format::Csv => print_series_csv(&view.series())?,
                Format::Text => {
                    for s in [&view.etim_summary, &view.iig_summary] {
                        println!(
                            "{}: {} projects, {:.2}M total",
                            s.dataset, s.total_projects, s.total_value
                        );
                    }
                    print_series_text(&view.series());
                }
            }
        }
        Commands::InitConfig { .. } => {}
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    serde_json::to_writer_pretty(io::stdout().lock(), value).context("writing JSON")?;
    println!();
    Ok(())
}

fn print_series_text(series: &[&Series]) {
    for s in series {
        println!("\n{}", s.title());
        for (label, value) in s.iter() {
            println!("  {:<40} {:>12.2}", label, value);
        }
    }
}

fn print_series_csv(series: &[&Series]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    wtr.write_record(["series", "label", "value"])?;
    for s in series {
        for (label, value) in s.iter() {
            wtr.write_record([s.title(), label, value.to_string().as_str()])?;
        }
    }
    wtr.flush().context("writing CSV")?;
    Ok(())
}

/// Union of record keys in first-seen order as the header.
fn print_projects_csv(projects: &[Record]) -> Result<()> {
    let mut headers: Vec<&str> = Vec::new();
    for key in projects.iter().flat_map(|p| p.keys()) {
        if !headers.contains(&key) {
            headers.push(key);
        }
    }

    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    wtr.write_record(&headers)?;
    for p in projects {
        wtr.write_record(headers.iter().map(|h| p.text(h)))?;
    }
    wtr.flush().context("writing CSV")?;
    Ok(())
}

fn print_developers_csv(view: &DevelopersView) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    wtr.write_record([
        "developer",
        "display_name",
        "high_priority",
        "projects",
        "states",
        "sectors",
        "total_value",
    ])?;
    for d in &view.developers {
        wtr.write_record([
            d.name.as_str(),
            d.display_name.as_str(),
            if d.high_priority { "true" } else { "false" },
            d.stats.project_count.to_string().as_str(),
            d.stats.states.join("; ").as_str(),
            d.stats.sectors.join("; ").as_str(),
            format!("{:.2}", d.stats.total_value).as_str(),
        ])?;
    }
    wtr.flush().context("writing CSV")?;
    Ok(())
}
