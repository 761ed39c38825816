//! cluster-review CLI — review selection and tagging over a case database.
//!
//! Usage:
//!   cluster-review import <fixture.yaml> [--db path]
//!   cluster-review runs [--db path]
//!   cluster-review clusters <run> [--db path]
//!   cluster-review tag <run> [--cluster id]... [--all] [--json] [--db path]
//!   cluster-review tags <guid> [--db path]

use clap::{Parser, Subcommand};
use cluster_review::{
    summarize, CancellationToken, CaseFixture, CaseStore, ClusterId, ClusterTagger, ItemId,
    Selection, SqliteCase, TracingProgress,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "cluster-review",
    version,
    about = "Tag the review set of each document cluster by endpoint status"
)]
struct Cli {
    /// Path to SQLite case database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a YAML case fixture into the database
    Import {
        /// Fixture file
        path: PathBuf,
    },
    /// List cluster runs
    Runs,
    /// Show the clusters of a run with item counts
    Clusters {
        /// Cluster run name
        run: String,
    },
    /// Tag the review set of each selected cluster
    Tag {
        /// Cluster run name
        run: String,
        /// Cluster to tag (repeatable); a number, `unclusterable` or `ignorable`
        #[arg(long = "cluster", value_parser = parse_cluster_id, allow_negative_numbers = true)]
        clusters: Vec<ClusterId>,
        /// Select every cluster, pseudo-clusters included
        #[arg(long, conflicts_with = "clusters")]
        all: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the tags applied to an item
    Tags {
        /// Item GUID
        guid: String,
    },
}

fn parse_cluster_id(s: &str) -> Result<ClusterId, String> {
    match s {
        "unclusterable" => Ok(ClusterId::UNCLUSTERABLE),
        "ignorable" => Ok(ClusterId::IGNORABLE),
        _ => s
            .parse::<i64>()
            .map(ClusterId::new)
            .map_err(|_| format!("invalid cluster id '{}'", s)),
    }
}

/// Get the default database path (~/.local/share/cluster-review/case.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("cluster-review").join("case.db")
}

fn open_case(db: &Path) -> Result<SqliteCase, String> {
    SqliteCase::open(db).map_err(|e| format!("Failed to open case database: {}", e))
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("cluster_review=debug,info")
        } else {
            EnvFilter::new("cluster_review=info,warn")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn cmd_import(case: &SqliteCase, path: &Path) -> i32 {
    let fixture = match CaseFixture::from_path(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: cannot load '{}': {}", path.display(), e);
            return 1;
        }
    };
    match case.import(&fixture) {
        Ok(summary) => {
            println!(
                "Imported {} items, {} cluster runs, {} clusters ({} memberships)",
                summary.items, summary.cluster_runs, summary.clusters, summary.members
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_runs(case: &SqliteCase) -> i32 {
    let runs = match case.list_cluster_runs() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if runs.is_empty() {
        println!("No cluster runs in case.");
        return 0;
    }
    println!("{:<40}  {:>8}", "CLUSTER RUN", "CLUSTERS");
    println!("{}", "-".repeat(50));
    for run in runs {
        println!("{:<40}  {:>8}", run.name, run.cluster_count);
    }
    0
}

fn cmd_clusters(case: &SqliteCase, run: &str) -> i32 {
    let rows = match summarize(case, case, run) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    println!(
        "{:<24}  {:<14}  {:>8}  {:>18}",
        "CLUSTER RUN", "ID", "ITEMS", "DEDUPLICATED ITEMS"
    );
    println!("{}", "-".repeat(70));
    for row in rows {
        println!(
            "{:<24}  {:<14}  {:>8}  {:>18}",
            row.run,
            row.display_id.to_string(),
            row.items,
            row.deduplicated_items
        );
    }
    0
}

fn cmd_tag(case: &SqliteCase, run: &str, clusters: Vec<ClusterId>, all: bool, json: bool) -> i32 {
    let selection = if all {
        Selection::all(case, run)
    } else if clusters.is_empty() {
        Selection::default_for(case, run)
    } else {
        Ok(Selection::new(run, clusters))
    };
    let chosen = match selection.and_then(|s| s.resolve(case)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let token = CancellationToken::new();
    let handler_token = token.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        tracing::warn!("cannot install interrupt handler: {}", e);
    }

    let progress = TracingProgress;
    let report = match ClusterTagger::new(case)
        .with_progress(&progress)
        .with_cancellation(token)
        .tag_all(run, &chosen)
    {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        }
    } else {
        for outcome in &report.clusters {
            println!("{:>8}  {}", outcome.tagged, outcome.label);
        }
        println!("{}", report.summary());
    }
    0
}

fn cmd_tags(case: &SqliteCase, guid: &str) -> i32 {
    match case.tags_for(&ItemId::from_string(guid)) {
        Ok(tags) if tags.is_empty() => {
            println!("No tags on item '{}'.", guid);
            0
        }
        Ok(tags) => {
            for tag in tags {
                println!("{}", tag);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let db_path = cli.db.unwrap_or_else(default_db_path);
    let case = match open_case(&db_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Import { path } => cmd_import(&case, &path),
        Commands::Runs => cmd_runs(&case),
        Commands::Clusters { run } => cmd_clusters(&case, &run),
        Commands::Tag {
            run,
            clusters,
            all,
            json,
        } => cmd_tag(&case, &run, clusters, all, json),
        Commands::Tags { guid } => cmd_tags(&case, &guid),
    };
    std::process::exit(code);
}
