use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use dkp_core::{
    Container, DockerCli, Image, PurgeConfig, PurgeResult, ResourcePurger, Settings,
    build_container_validator, build_image_validator, format_bytes,
};

#[derive(Parser)]
#[command(name = "dkp")]
#[command(about = "Purge docker containers and images matching filter expressions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Filter expression such as `created>7d` (repeatable, comma separated)
    #[arg(short, long = "filter", global = true, action = clap::ArgAction::Append, value_delimiter = ',')]
    pub filters: Vec<String>,

    /// Docker daemon address, passed to `docker -H`
    #[arg(short = 'd', long = "docker", env = "DOCKER_HOST", global = true)]
    pub docker_host: Option<String>,

    /// Dry run - list what would be removed without removing anything
    #[arg(short = 'p', long, global = true)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Settings file (defaults to `<config_dir>/dkp/config.toml`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Remove containers matching all filters (fields: created, exited)
    Container,
    /// Remove images matching all filters (fields: created, name, tag, size)
    Image,
}

/// 命令行参数与配置文件合并后的运行参数
#[derive(Debug, Clone, PartialEq, Eq)]
struct RunOptions {
    filters: Vec<String>,
    dry_run: bool,
    yes: bool,
}

impl RunOptions {
    fn merge(cli: &Cli, settings: &Settings) -> Self {
        let configured = match cli.command {
            Commands::Container => &settings.container.filters,
            Commands::Image => &settings.image.filters,
        };
        let filters = if cli.filters.is_empty() {
            configured.clone()
        } else {
            cli.filters.clone()
        };

        Self {
            filters: filters
                .into_iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            dry_run: cli.dry_run || settings.dry_run,
            yes: cli.yes,
        }
    }
}

fn merge_settings(cli: &Cli, mut settings: Settings) -> Settings {
    if cli.docker_host.is_some() {
        settings.docker_host = cli.docker_host.clone();
    }
    settings
}

pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // 设置日志级别
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("dkp={log_level},dkp_core={log_level},dkp_cli={log_level}"))
        .init();

    let settings = merge_settings(&cli, Settings::load(cli.config.as_deref())?);
    let options = RunOptions::merge(&cli, &settings);

    if options.filters.is_empty() {
        warn!("未指定过滤条件，不会删除任何资源");
    }

    let client = DockerCli::new(settings.docker_config());
    let purger = ResourcePurger::new(
        client,
        PurgeConfig {
            dry_run: options.dry_run,
        },
    );

    match cli.command {
        Commands::Container => handle_container_command(&purger, &options),
        Commands::Image => handle_image_command(&purger, &options),
    }
}

fn handle_container_command(purger: &ResourcePurger<DockerCli>, options: &RunOptions) -> Result<()> {
    // 过滤条件错误在删除前中止
    let validator =
        build_container_validator(&options.filters).context("invalid container filter")?;
    info!("容器过滤条件: {:?}", options.filters);

    let containers = purger.select_containers(&validator)?;
    if containers.is_empty() {
        println!("No containers matched.");
        return Ok(());
    }

    display_containers(&containers);

    if !options.yes && !options.dry_run && !confirm_purge("containers", containers.len(), None)? {
        println!("Purge cancelled.");
        return Ok(());
    }

    let result = purger.remove_containers(&containers);
    display_purge_result("containers", &result);
    Ok(())
}

fn handle_image_command(purger: &ResourcePurger<DockerCli>, options: &RunOptions) -> Result<()> {
    let validator = build_image_validator(&options.filters).context("invalid image filter")?;
    info!("镜像过滤条件: {:?}", options.filters);

    let images = purger.select_images(&validator)?;
    if images.is_empty() {
        println!("No images matched.");
        return Ok(());
    }

    display_images(&images);

    let total = total_image_size(&images);
    if !options.yes && !options.dry_run && !confirm_purge("images", images.len(), Some(total))? {
        println!("Purge cancelled.");
        return Ok(());
    }

    let result = purger.remove_images(&images);
    display_purge_result("images", &result);
    Ok(())
}

fn total_image_size(images: &[Image]) -> u64 {
    images
        .iter()
        .map(|img| u64::try_from(img.size).unwrap_or(0))
        .sum()
}

fn display_containers(containers: &[Container]) {
    println!("\nMatched {} containers:", containers.len());
    println!("{:<14} {:<30} {:<30}", "Container", "Name", "Status");
    println!("{}", "-".repeat(76));

    for ctn in containers {
        println!(
            "{:<14} {:<30} {:<30}",
            ctn.short_id(),
            ctn.display_name(),
            ctn.status
        );
    }
}

fn display_images(images: &[Image]) {
    println!("\nMatched {} images:", images.len());
    println!("{:<14} {:<50} {:<15}", "Image", "Tags", "Size");
    println!("{}", "-".repeat(81));

    for img in images {
        println!(
            "{:<14} {:<50} {:<15}",
            img.short_id(),
            img.display_name(),
            format_bytes(u64::try_from(img.size).unwrap_or(0))
        );
    }

    println!("{}", "-".repeat(81));
    println!("Total size: {}", format_bytes(total_image_size(images)));
}

fn confirm_purge(kind: &str, count: usize, size: Option<u64>) -> Result<bool> {
    match size {
        Some(size) => print!(
            "\nThis will remove {count} {kind} and free up {}. Continue? [y/N]: ",
            format_bytes(size)
        ),
        None => print!("\nThis will remove {count} {kind}. Continue? [y/N]: "),
    }

    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_confirmed(&input))
}

fn is_confirmed(input: &str) -> bool {
    let answer = input.trim().to_lowercase();
    answer == "y" || answer == "yes"
}

fn display_purge_result(kind: &str, result: &PurgeResult) {
    if result.dry_run {
        println!("\nDry run, nothing removed.");
        println!("Would remove {}: {}", kind, result.removed.len());
    } else {
        println!("\nPurge completed!");
        println!("Removed {}: {}", kind, result.removed.len());
    }
    if result.reclaimed_bytes > 0 {
        println!("Size freed: {}", result.format_size());
    }

    if !result.failures.is_empty() {
        println!("\nFailed to remove {} {}:", result.failures.len(), kind);
        for failure in &result.failures {
            println!("  - {failure}");
        }
    }
}
