use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use pwnstore_core::hints::suggested_lines;
use pwnstore_core::lifecycle::find_record;
use pwnstore_core::registry::{parse_sources, to_registry_json};
use pwnstore_core::{
    resolve_base_dir, HttpTransport, LifecycleEngine, PwnStoreError, RegistryBuilder, Result,
    StoreConfig, UpgradeCandidate, UpgradeOutcome,
};

mod args;
use args::{Cli, Commands, ConfigAction, Shell};

type Engine = LifecycleEngine<HttpTransport>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let base_dir = resolve_base_dir(cli.base_dir);
    let mut config = match StoreConfig::load(&base_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            return ExitCode::from(e.exit_code() as u8);
        }
    };
    if let Some(dir) = cli.plugin_dir {
        config.plugin_dir = dir;
    }
    if let Some(path) = cli.host_config {
        config.host_config = path;
    }

    let mut engine = LifecycleEngine::new(config, HttpTransport::new());
    if let Some(url) = cli.registry {
        engine = engine.with_registry_url(url);
    }

    let result = match cli.command {
        Some(Commands::List) => handle_list(&engine),
        Some(Commands::Search { query }) => handle_search(&engine, &query),
        Some(Commands::Info { name }) => handle_info(&engine, &name),
        Some(Commands::Install { name }) => handle_install(&engine, &name),
        Some(Commands::Uninstall { name }) => handle_uninstall(&engine, &name),
        Some(Commands::Upgrade { name, yes }) => handle_upgrade(&engine, name.as_deref(), yes),
        Some(Commands::Installed) => handle_installed(&engine),
        Some(Commands::Build { sources, output }) => handle_build(&engine, &sources, &output),
        Some(Commands::Config { action }) => handle_config(action, &engine, &base_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            banner();
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Log to stderr; PWNSTORE_LOG overrides the default level
fn init_logging(verbose: bool) {
    let default = if verbose {
        "pwnstore_core=debug,pwnstore=debug"
    } else {
        "pwnstore_core=warn,pwnstore=warn"
    };
    let filter = EnvFilter::try_from_env("PWNSTORE_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn banner() {
    println!("{}", r"  ____                _____ _                  ".cyan());
    println!("{}", r" |  _ \ _      ___ __/ ____| |                 ".cyan());
    println!("{}", r" | |_) \ \ /\ / / '_ \ (___| |_ ___  _ __ ___  ".cyan());
    println!("{}", r" |  __/ \ V  V /| | | \___ \ __/ _ \| '__/ _ \ ".cyan());
    println!("{}", r" |_|     \_/\_/ |_| |_|____/\__\___/|_|  \___| ".cyan());
    println!();
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "pwnstore", &mut io::stdout());
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

fn print_table(engine: &Engine, records: &[pwnstore_core::PluginRecord]) -> Result<()> {
    let installed = engine.installed()?;

    println!(
        "{:<20} | {:<8} | {:<9} | {:<10} | DESCRIPTION",
        "NAME", "VERSION", "CATEGORY", "STATUS"
    );
    println!("{}", "-".repeat(95));
    for record in records {
        let status = if installed.contains(&record.name) {
            format!("{:<10}", "INSTALLED").green().to_string()
        } else {
            format!("{:<10}", "Available")
        };
        println!(
            "{:<20} | {:<8} | {:<9} | {} | {}",
            record.name,
            record.version,
            record.category.as_str(),
            status,
            truncate(&record.description, 40)
        );
    }
    println!("{}", "-".repeat(95));
    Ok(())
}

fn handle_list(engine: &Engine) -> Result<()> {
    println!("[*] Fetching plugin list...");
    let registry = engine.fetch_registry()?;
    print_table(engine, &registry)
}

fn handle_search(engine: &Engine, query: &str) -> Result<()> {
    let query_lower = query.to_lowercase();
    let matches: Vec<_> = engine
        .fetch_registry()?
        .into_iter()
        .filter(|r| r.matches_query(&query_lower))
        .collect();

    if matches.is_empty() {
        println!("No results found for: {}", query);
        return Ok(());
    }

    print_table(engine, &matches)
}

fn handle_info(engine: &Engine, name: &str) -> Result<()> {
    let record = find_record(engine.fetch_registry()?, name)?;

    println!();
    println!("{}", format!("--- {} ---", record.name).cyan());
    println!("Author:      {}", record.author);
    println!("Version:     {}", record.version);
    println!("Category:    {}", record.category);
    println!("Origin:      {}", record.origin_type);
    if let Some(path) = &record.path_inside_zip {
        println!("Archive path: {}", path);
    }

    if let Some(local) = engine.local_status(name)? {
        let enabled = match local.enabled {
            Some(true) => "enabled".green().to_string(),
            Some(false) => "disabled".yellow().to_string(),
            None => "not in config".dimmed().to_string(),
        };
        println!(
            "Installed:   {} ({})",
            local.version.green(),
            enabled
        );
    }

    println!();
    println!("{}", "Description:".yellow());
    println!("{}", record.description);
    println!();
    println!("{}", "Download URL:".yellow());
    println!("{}", record.download_url);
    println!();
    Ok(())
}

fn handle_install(engine: &Engine, name: &str) -> Result<()> {
    let record = engine.find(name)?;
    println!(
        "[*] Installing {} by {}...",
        record.name.cyan(),
        record.author
    );
    if record.is_archive() {
        println!("[*] Downloading repository archive...");
    } else {
        println!("[*] Downloading file...");
    }

    let report = engine.install_record(&record)?;
    println!(
        "{} Successfully installed to {} ({} bytes)",
        "[+]".green(),
        report.path.display(),
        report.bytes_written
    );
    report_config(report.config_error.as_ref(), "Enabled");

    if !report.option_hints.is_empty() {
        println!();
        println!("{}", "[!] CONFIGURATION REQUIRED:".yellow());
        println!("This plugin references the following options. You likely need to add them to config.toml:");
        for line in suggested_lines(&report.name, &report.option_hints) {
            println!("  {}", line);
        }
    }
    Ok(())
}

fn handle_uninstall(engine: &Engine, name: &str) -> Result<()> {
    println!(
        "[*] Removing {}...",
        engine.config().plugin_path(name).display()
    );
    let report = engine.uninstall(name)?;
    println!("{} File removed.", "[+]".green());
    report_config(report.config_error.as_ref(), "Disabled");
    Ok(())
}

fn report_config(error: Option<&PwnStoreError>, state: &str) {
    match error {
        None => println!(
            "{} Plugin {} in config.toml. Restart required.",
            "[+]".green(),
            state
        ),
        Some(e) => println!(
            "{} {}. Edit config.toml manually.",
            "[!]".yellow(),
            e
        ),
    }
}

fn handle_upgrade(engine: &Engine, name: Option<&str>, yes: bool) -> Result<()> {
    println!("[*] Checking for updates...");

    let outcome = engine.upgrade(name, |candidates| {
        print_candidates(candidates);
        yes || confirm("Upgrade these plugins?")
    })?;

    match outcome {
        UpgradeOutcome::UpToDate => {
            println!("{} All plugins are up to date.", "[+]".green());
            Ok(())
        }
        UpgradeOutcome::Declined { .. } => {
            println!("Aborted.");
            Ok(())
        }
        UpgradeOutcome::Applied { results } => {
            let mut first_error = None;
            for item in results {
                match item.result {
                    Ok(report) => {
                        println!("{} Upgraded {}", "[+]".green(), item.name.cyan());
                        if let Some(e) = &report.config_error {
                            println!("{} {}", "[!]".yellow(), e);
                        }
                    }
                    Err(e) => {
                        println!("{} Failed to upgrade {}: {}", "[!]".red(), item.name, e);
                        first_error.get_or_insert(e);
                    }
                }
            }
            match first_error {
                Some(e) => Err(e),
                None => {
                    println!("Restart required.");
                    Ok(())
                }
            }
        }
    }
}

fn print_candidates(candidates: &[UpgradeCandidate]) {
    println!();
    println!("{}", "Updates available:".cyan().bold());
    for c in candidates {
        println!(
            "  {:<20} {} -> {}",
            c.name,
            c.local_version.dimmed(),
            c.remote_version.green()
        );
    }
    println!();
}

/// y/N prompt. EOF or a failed read counts as no.
fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) | Err(_) => {
            println!();
            false
        }
        Ok(_) => {
            let answer = input.trim();
            answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
        }
    }
}

fn handle_installed(engine: &Engine) -> Result<()> {
    let plugins = engine.list_local()?;
    if plugins.is_empty() {
        println!(
            "No plugins installed in {}",
            engine.config().plugin_dir.display()
        );
        return Ok(());
    }

    println!("{:<20} | {:<8} | STATUS", "NAME", "VERSION");
    println!("{}", "-".repeat(50));
    for plugin in plugins {
        let status = match plugin.enabled {
            Some(true) => "enabled".green().to_string(),
            Some(false) => "disabled".yellow().to_string(),
            None => "not in config".dimmed().to_string(),
        };
        println!("{:<20} | {:<8} | {}", plugin.name, plugin.version, status);
    }
    Ok(())
}

fn handle_build(engine: &Engine, sources: &Path, output: &Path) -> Result<()> {
    let text = fs::read_to_string(sources)?;
    let urls = parse_sources(&text);
    println!("[*] Processing {} sources...", urls.len());

    let builder = RegistryBuilder::new(engine.client(), &engine.config().plugin_extension);
    let records = builder.build(&urls);

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &records {
        println!("   {} {:<25} -> {}", "[+]".green(), record.name, record.category);
        *counts.entry(record.category.as_str()).or_insert(0) += 1;
    }

    fs::write(output, to_registry_json(&records)).map_err(|source| {
        PwnStoreError::WriteFailure {
            path: output.to_path_buf(),
            source,
        }
    })?;

    println!();
    for (category, count) in counts {
        println!("  {:<10} {}", category, count);
    }
    println!(
        "{} Wrote {} plugins to {}",
        "[SUCCESS]".green(),
        records.len(),
        output.display()
    );
    Ok(())
}

fn handle_config(action: ConfigAction, engine: &Engine, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!();
            for (key, value) in engine.config().list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!("{} = {}", "effective_registry".cyan(), engine.registry_source());
            println!();
        }
        ConfigAction::Path => {
            println!("{}", StoreConfig::path(base_dir).display());
        }
        ConfigAction::Init => {
            let path = StoreConfig::init(base_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}
