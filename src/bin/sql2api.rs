//! sql2api: compile queries and reshape their rows from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Write a starter project file
//! sql2api init
//!
//! # Show the SQL for the project's query
//! sql2api compile --limit 5
//!
//! # Map rows saved as JSON with the project's rules
//! sql2api map --rows rows.json
//!
//! # Run against the database and print the mapped sample
//! SQL2API_DATABASE_URL=postgres://localhost/shop sql2api preview
//! ```

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sql2api::config::{CONFIG_FILE, DATABASE_URL_ENV, STARTER_CONFIG, config_search_paths};
use sql2api::engine;
use sql2api::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sql2api")]
#[command(version)]
#[command(about = "Compose SELECT queries and map their rows into nested JSON", long_about = None)]
#[command(after_help = "EXAMPLES:
    sql2api init
    sql2api compile --limit 10
    sql2api map --rows rows.json --rules rules.json
    sql2api preview --database-url postgres://app@localhost/shop")]
struct Cli {
    /// Project file (defaults to ./sql2api.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Read the query from a JSON file instead of the project file
    #[arg(short, long, global = true)]
    query: Option<PathBuf>,

    /// Database connection URL (overrides [connection])
    #[arg(long, env = "SQL2API_DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter sql2api.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the SQL for the query
    Compile {
        /// Override the query's LIMIT
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Lint the compiled SQL, optionally asking the database for a plan
    Validate {
        /// Run EXPLAIN against the database as well
        #[arg(long)]
        explain: bool,
    },
    /// Map rows from a JSON file into nested objects
    Map {
        /// JSON array of flat row objects
        #[arg(short, long)]
        rows: PathBuf,
        /// JSON array of mapping rules (defaults to the project's)
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Run the query with a small limit and show the mapped sample
    Preview,
    /// Run the query and print the mapped result
    Run {
        /// Override the query's LIMIT
        #[arg(short, long)]
        limit: Option<u32>,
        /// Print the raw rows instead of mapped objects
        #[arg(long)]
        raw: bool,
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
    /// Show the join kind reference
    Joins,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sql2api=debug" } else { "sql2api=warn" };
    let filter = EnvFilter::try_from_env("SQL2API_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init { force } => init_project(*force),
        Commands::Compile { limit } => {
            let project = load_project(cli)?;
            let sql = compile(&project.query_description(), *limit)?;
            println!("{}", sql);
            Ok(())
        }
        Commands::Validate { explain } => validate(cli, *explain).await,
        Commands::Map { rows, rules } => map_file(cli, rows, rules.as_deref()),
        Commands::Preview => preview(cli).await,
        Commands::Run { limit, raw, format } => execute(cli, *limit, *raw, format).await,
        Commands::Joins => {
            show_joins();
            Ok(())
        }
    }
}

fn init_project(force: bool) -> anyhow::Result<()> {
    let path = Path::new(CONFIG_FILE);
    if path.exists() && !force {
        bail!("{} already exists. Use --force to overwrite.", CONFIG_FILE);
    }
    fs::write(path, STARTER_CONFIG).with_context(|| format!("writing {}", CONFIG_FILE))?;
    println!("{} Wrote {}", "✓".green(), CONFIG_FILE.cyan());
    Ok(())
}

/// Project file, with `--query` replacing its query section when given.
fn load_project(cli: &Cli) -> anyhow::Result<ProjectConfig> {
    let mut project = match (&cli.config, &cli.query) {
        (None, Some(_)) => ProjectConfig::default(),
        (config, _) => match ProjectConfig::load(config.as_deref()) {
            Ok((path, project)) => {
                tracing::debug!(path = %path.display(), "using project file");
                project
            }
            Err(BuilderError::Config(msg)) if cli.query.is_none() => {
                let searched: Vec<String> = config_search_paths()
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                bail!("{} (searched: {})", msg, searched.join(", "));
            }
            Err(e) => return Err(e.into()),
        },
    };

    if let Some(path) = &cli.query {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading query from {}", path.display()))?;
        project.query = serde_json::from_str(&content)
            .with_context(|| format!("parsing query from {}", path.display()))?;
    }
    Ok(project)
}

fn connection(cli: &Cli, project: &ProjectConfig) -> anyhow::Result<ConnectionConfig> {
    if let Some(url) = &cli.database_url {
        return Ok(ConnectionConfig::from_url(url.clone())?);
    }
    match &project.connection {
        Some(conn) => Ok(conn.clone()),
        None => bail!(
            "No database connection. Add [connection] to {} or set {}",
            CONFIG_FILE,
            DATABASE_URL_ENV
        ),
    }
}

async fn validate(cli: &Cli, explain: bool) -> anyhow::Result<()> {
    let project = load_project(cli)?;
    let sql = project.query_description().to_sql()?;
    let report = validate_sql(&sql);

    if !report.valid {
        for error in &report.errors {
            println!("{} {}", "✗".red(), error);
        }
        bail!("{} problem(s) found", report.errors.len());
    }
    println!("{} Syntax checks passed", "✓".green());

    if explain {
        let conn = connection(cli, &project)?;
        engine::explain(&conn, &sql).await?;
        println!("{} {} accepted the query plan", "✓".green(), conn.dialect.to_string().cyan());
    }
    Ok(())
}

fn map_file(cli: &Cli, rows_path: &Path, rules_path: Option<&Path>) -> anyhow::Result<()> {
    let content = fs::read_to_string(rows_path)
        .with_context(|| format!("reading rows from {}", rows_path.display()))?;
    let rows: Vec<Row> = serde_json::from_str(&content)
        .with_context(|| format!("parsing rows from {}", rows_path.display()))?;

    let rules: Vec<MappingRule> = match rules_path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading rules from {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("parsing rules from {}", path.display()))?
        }
        None => load_project(cli)?.mapping_rules(),
    };

    let mapped = map_rows(&rows, &rules);
    println!("{}", serde_json::to_string_pretty(&mapped)?);
    Ok(())
}

async fn preview(cli: &Cli) -> anyhow::Result<()> {
    let project = load_project(cli)?;
    let conn = connection(cli, &project)?;
    let (sql, rows) = engine::preview(&conn, &project.query_description()).await?;

    println!("{}", "Generated SQL:".green().bold());
    println!("{}", sql.white());
    println!();

    let rules = project.mapping_rules();
    let mapped = map_rows(&rows, &rules);
    println!("{}", "Sample Data:".green().bold());
    println!("{}", serde_json::to_string_pretty(&rows)?);
    println!();
    println!("{}", "Mapped Output:".green().bold());
    println!("{}", serde_json::to_string_pretty(&mapped)?);
    Ok(())
}

async fn execute(
    cli: &Cli,
    limit: Option<u32>,
    raw: bool,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let project = load_project(cli)?;
    let conn = connection(cli, &project)?;
    let sql = compile(&project.query_description(), limit)?;
    if cli.verbose {
        eprintln!("{}\n{}", "SQL:".dimmed(), sql.dimmed());
    }

    let rows = engine::execute(&conn, &sql).await?;
    if rows.is_empty() {
        println!("{}", "(no results)".dimmed());
        return Ok(());
    }

    match (raw, format) {
        (true, OutputFormat::Table) => print_table(&rows),
        (true, OutputFormat::Json) => println!("{}", serde_json::to_string_pretty(&rows)?),
        (false, _) => {
            let mapped = map_rows(&rows, &project.mapping_rules());
            println!("{}", serde_json::to_string_pretty(&mapped)?);
        }
    }
    Ok(())
}

fn print_table(rows: &[Row]) {
    let columns: Vec<&String> = rows[0].keys().collect();

    let cell = |row: &Row, col: &str| -> String {
        match row.get(col) {
            Some(SqlValue::Null) | None => "NULL".to_string(),
            Some(SqlValue::Text(s)) => s.clone(),
            Some(other) => other.to_json().to_string(),
        }
    };

    let widths: Vec<usize> = columns
        .iter()
        .map(|c| {
            rows.iter()
                .map(|r| cell(r, c.as_str()).chars().count())
                .max()
                .unwrap_or(0)
                .max(c.chars().count())
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:width$}", c, width = *w))
        .collect();
    println!("{}", header.join(" │ ").white().bold());

    let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    println!("{}", sep.join("─┼─").dimmed());

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:width$}", cell(row, c.as_str()), width = *w))
            .collect();
        println!("{}", cells.join(" │ "));
    }

    println!();
    println!("{} row(s) returned", rows.len().to_string().cyan());
}

fn show_joins() {
    println!("{}", "Join Reference".cyan().bold());
    println!();
    println!(
        "{:12} {:30} {:30} {}",
        "Type".white().bold(),
        "Label".white().bold(),
        "Set".white().bold(),
        "Use case".white().bold()
    );
    println!("{}", "─".repeat(110).dimmed());

    for kind in JoinKind::ALL {
        println!(
            "{:12} {:30} {:30} {}",
            kind.as_str().cyan().bold(),
            kind.label().yellow(),
            kind.set_theory().white(),
            kind.use_case().dimmed()
        );
    }

    println!();
    println!(
        "{}",
        "*_NULL joins add an IS NULL filter; it is merged with your WHERE into a single clause."
            .dimmed()
    );
}
