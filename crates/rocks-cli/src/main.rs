//! ROS Rocks - release status for ROS packages
//!
//! The `rocks` command reads cached buildfarm status feeds and reports how
//! consistently each package is released.
//!
//! ## Commands
//!
//! - `report`: Classify every package and write JSON / markdown
//! - `package`: Show one package's status per distribution
//! - `distros`: List every distribution seen
//! - `conflicts`: List merge conflicts between channels
//! - `repo`: Classify a source-control URL

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rocks_core::{
    build_status_report, write_report_json, write_summary_md, CacheDirSource, PackageReport,
    StatusReport,
};
use snapshot_merge::match_repo_url;
use tracing::{info, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "rocks")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Release consistency report for ROS packages", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines (same as --log-format json)
    #[arg(long, global = true)]
    json: bool,

    /// Log line format
    #[arg(long, global = true, env = "ROCKS_LOG_FORMAT", value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Directory holding cached `<prefix>_<distro>_<channel>.yaml` feeds
    #[arg(long, global = true, env = "ROCKS_CACHE_DIR", default_value = ".rocks/cache")]
    cache_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn json_logs(&self) -> bool {
        self.json || self.log_format == LogFormat::Json
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify every package and write the report
    Report {
        /// Write the JSON report here (default: print to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write a markdown summary here
        #[arg(long)]
        markdown: Option<PathBuf>,
    },

    /// Show one package's status in every distribution
    Package {
        /// Package name
        name: String,

        /// Print the package report as JSON
        #[arg(long)]
        raw: bool,
    },

    /// List every distribution, legacy distributions first
    Distros,

    /// List channel merge conflicts
    Conflicts,

    /// Classify a source-control URL
    Repo {
        /// Upstream URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    rocks_core::init_tracing(cli.json_logs(), level);

    match cli.command {
        Commands::Report { output, markdown } => {
            cmd_report(&cli.cache_dir, output.as_deref(), markdown.as_deref()).await
        }
        Commands::Package { name, raw } => cmd_package(&cli.cache_dir, &name, raw).await,
        Commands::Distros => cmd_distros(&cli.cache_dir).await,
        Commands::Conflicts => cmd_conflicts(&cli.cache_dir).await,
        Commands::Repo { url } => cmd_repo(&url),
    }
}

async fn load_report(cache_dir: &Path) -> Result<StatusReport> {
    if !cache_dir.is_dir() {
        bail!(
            "cache directory {:?} does not exist (set --cache-dir or ROCKS_CACHE_DIR)",
            cache_dir
        );
    }
    let source = Arc::new(CacheDirSource::new(cache_dir));
    build_status_report(source)
        .await
        .with_context(|| format!("build status report from {:?}", cache_dir))
}

/// Classify every package and write the report
async fn cmd_report(cache_dir: &Path, output: Option<&Path>, markdown: Option<&Path>) -> Result<()> {
    let report = load_report(cache_dir).await?;

    match output {
        Some(path) => {
            write_report_json(path, &report)?;
            println!("Wrote {} packages to {:?}", report.packages.len(), path);
        }
        None => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serialize status report")?
        ),
    }

    if let Some(path) = markdown {
        write_summary_md(path, &report)?;
        println!("Wrote summary to {:?}", path);
    }

    info!(
        packages = report.packages.len(),
        distros = report.distros.len(),
        "report complete"
    );
    Ok(())
}

/// Show one package
async fn cmd_package(cache_dir: &Path, name: &str, raw: bool) -> Result<()> {
    let report = load_report(cache_dir).await?;
    let Some(package) = report.package(name) else {
        bail!("package '{}' not found in {:?}", name, cache_dir);
    };

    if raw {
        println!("{}", serde_json::to_string_pretty(package)?);
    } else {
        print!("{}", format_package(name, package, &report.distros));
    }
    Ok(())
}

fn format_package(name: &str, package: &PackageReport, distros: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{name}");
    for maintainer in &package.maintainers {
        match &maintainer.email {
            Some(email) => {
                let _ = writeln!(out, "Maintainer: {} <{}>", maintainer.name, email);
            }
            None => {
                let _ = writeln!(out, "Maintainer: {}", maintainer.name);
            }
        }
    }
    for repo in &package.repo {
        let _ = writeln!(out, "Repo:       {} ({})", repo.url, repo.name);
    }
    out.push('\n');

    for distro in distros {
        let Some(status) = package.status.get(distro) else {
            continue;
        };
        let _ = writeln!(out, "{:<10} {:<12} {}", distro, status.class, status.version);
        for line in status.status.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    out
}

/// List distributions
async fn cmd_distros(cache_dir: &Path) -> Result<()> {
    let report = load_report(cache_dir).await?;
    if report.distros.is_empty() {
        println!("No distributions found in {:?}", cache_dir);
    }
    for distro in &report.distros {
        println!("{distro}");
    }
    Ok(())
}

/// List merge conflicts
async fn cmd_conflicts(cache_dir: &Path) -> Result<()> {
    let report = load_report(cache_dir).await?;
    if report.conflicts.is_empty() {
        println!("No merge conflicts");
        return Ok(());
    }
    for conflict in &report.conflicts {
        println!("{conflict}");
    }
    println!("\n{} conflict(s)", report.conflicts.len());
    Ok(())
}

/// Classify a repository URL
fn cmd_repo(url: &str) -> Result<()> {
    match match_repo_url(url) {
        Some((host, repo)) => {
            println!("Host: {:?}", host);
            println!("URL:  {}", repo.url);
            println!("Name: {}", repo.name);
        }
        None => println!("Unrecognised repository URL: {}", url),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocks_core::{StatusClass, StatusClassification};
    use rocks_model::{Maintainer, RepoRef};
    use std::collections::BTreeMap;

    #[test]
    fn parses_report_flags() {
        let cli = Cli::try_parse_from([
            "rocks",
            "--cache-dir",
            "/tmp/feeds",
            "report",
            "--output",
            "status.json",
            "--markdown",
            "status.md",
        ])
        .unwrap();
        assert_eq!(cli.cache_dir, PathBuf::from("/tmp/feeds"));
        match cli.command {
            Commands::Report { output, markdown } => {
                assert_eq!(output, Some(PathBuf::from("status.json")));
                assert_eq!(markdown, Some(PathBuf::from("status.md")));
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn json_flag_overrides_log_format() {
        let cli = Cli::try_parse_from(["rocks", "distros", "--json"]).unwrap();
        assert!(cli.json_logs());

        let cli = Cli::try_parse_from(["rocks", "--log-format", "json", "distros"]).unwrap();
        assert!(cli.json_logs());
    }

    #[test]
    fn version_flag_reports_core_version() {
        let err = Cli::try_parse_from(["rocks", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert_eq!(err.to_string().trim(), format!("rocks {}", rocks_core::VERSION));
    }

    #[test]
    fn package_requires_name() {
        assert!(Cli::try_parse_from(["rocks", "package"]).is_err());
    }

    #[test]
    fn formats_package_in_distro_order() {
        let package = PackageReport {
            maintainers: vec![Maintainer::new("Jane Doe", "jane@example.org")],
            repo: vec![RepoRef::new("https://github.com/ros/ros_comm", "ros_comm")],
            status: BTreeMap::from([
                (
                    "humble".to_string(),
                    StatusClassification::new(StatusClass::Good, "released", "1.17.0"),
                ),
                (
                    "noetic".to_string(),
                    StatusClassification::new(
                        StatusClass::Complicated,
                        "1.15.0 (focal)\n1.16.0 (jammy)",
                        "1.16.0",
                    ),
                ),
            ]),
        };
        let distros = vec!["noetic".to_string(), "humble".to_string()];

        let expected = "roscpp\n\
Maintainer: Jane Doe <jane@example.org>\n\
Repo:       https://github.com/ros/ros_comm (ros_comm)\n\
\n\
noetic     complicated  1.16.0\n    1.15.0 (focal)\n    1.16.0 (jammy)\n\
humble     good         1.17.0\n    released\n";
        assert_eq!(format_package("roscpp", &package, &distros), expected);
    }

    #[tokio::test]
    async fn missing_cache_dir_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_report(&dir.path().join("absent")).await.unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
