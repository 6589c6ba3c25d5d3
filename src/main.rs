//! Geopublish CLI
//!
//! Entry point for the `geopublish` command-line tool.

use clap::{Args, Parser, Subcommand};
use geopublish::config::{default_global_config_path, session_path, GLOBAL_FILE_NAME};
use geopublish::discovery::{record_files, DEFAULT_FILE_FILTER};
use geopublish::generate::{GenerateOptions, Generator};
use geopublish::params::{self, ParamReport};
use geopublish::publish::{PublishPhase, Publisher, RunReport};
use geopublish::{
    CatalogConnection, CatalogTransport, ConfigResolver, ConfigTier, DryRunTransport,
    HttpTransport, NameRules, Prompter, PublishMode, RunContext, TerminalPrompter, TierKind,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the catalog password
const PASSWORD_ENV: &str = "GEOPUBLISH_PASSWORD";

#[derive(Parser)]
#[command(name = "geopublish")]
#[command(about = "Generate publish data for raster datasets and push it to GeoServer", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Directory holding the datasets and their .gpd files
    #[arg(long, default_value = ".")]
    process_dir: PathBuf,

    /// File name pattern (for record modes .gpd is appended)
    #[arg(long, default_value = DEFAULT_FILE_FILTER)]
    file_filter: String,

    /// Global defaults file (default: ~/.config/geopublish/config.default)
    #[arg(long)]
    global_config: Option<PathBuf>,

    /// Echo what would happen; no files written, no requests made
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate .gpd files next to the raster datasets
    Generate {
        #[command(flatten)]
        common: CommonArgs,

        /// Patterns removed from file names (comma-separated)
        #[arg(long, value_delimiter = ',')]
        strip_name: Vec<String>,

        /// Prefix for coverage store names
        #[arg(long, default_value = "")]
        covstore_key: String,

        /// Prefix for coverage names
        #[arg(long, default_value = "")]
        coverage_key: String,

        /// Catalog workspace the stores are added to (must exist)
        #[arg(long)]
        workspace: Option<String>,

        /// Ask for the values of every dataset
        #[arg(long)]
        interactive: bool,
    },

    /// Show one key of every selected record
    ShowParam {
        #[command(flatten)]
        common: CommonArgs,

        key: String,
    },

    /// Prompt for a new value of one key in every selected record
    SetParam {
        #[command(flatten)]
        common: CommonArgs,

        key: String,
    },

    /// Set one key in every selected record (`:other` copies key `other`)
    UpdateParam {
        #[command(flatten)]
        common: CommonArgs,

        key: String,

        value: String,
    },

    /// Publish stores, coverages and layer options to the catalog
    Publish {
        #[command(flatten)]
        common: CommonArgs,

        /// Publish the coverage stores
        #[arg(long)]
        pub_stores: bool,

        /// Publish the coverages (the catalog creates a layer for each)
        #[arg(long)]
        pub_coverages: bool,

        /// Set the layer options
        #[arg(long)]
        set_layeroptions: bool,

        /// Update existing catalog objects instead of creating them
        #[arg(long)]
        update: bool,

        /// Ignore proxy settings from the environment
        #[arg(long)]
        no_proxy: bool,

        /// Write the run log as JSON to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            common,
            strip_name,
            covstore_key,
            coverage_key,
            workspace,
            interactive,
        } => {
            init_tracing(common.debug);
            let names = NameRules {
                strip_patterns: strip_name,
                store_prefix: covstore_key,
                coverage_prefix: coverage_key,
            };
            run_generate(common, names, workspace, interactive);
        }
        Commands::ShowParam { common, key } => {
            init_tracing(common.debug);
            run_show_param(&common, &key);
        }
        Commands::SetParam { common, key } => {
            init_tracing(common.debug);
            run_set_param(&common, &key);
        }
        Commands::UpdateParam { common, key, value } => {
            init_tracing(common.debug);
            run_update_param(&common, &key, &value);
        }
        Commands::Publish {
            common,
            pub_stores,
            pub_coverages,
            set_layeroptions,
            update,
            no_proxy,
            log_file,
        } => {
            init_tracing(common.debug);
            let phases = PublishPhase::selected(pub_stores, pub_coverages, set_layeroptions);
            run_publish(&common, &phases, PublishMode::from_update_flag(update), no_proxy, log_file);
        }
    }
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

fn run_generate(
    common: CommonArgs,
    names: NameRules,
    workspace: Option<String>,
    interactive: bool,
) {
    let resolver = load_resolver(&common);
    let options = GenerateOptions {
        process_dir: common.process_dir,
        file_filter: common.file_filter,
        names,
        workspace,
        interactive,
        debug: common.debug,
    };

    let mut prompter = TerminalPrompter::new();
    let mut generator = Generator::new(options, resolver, &mut prompter);
    match generator.run() {
        Ok(records) => {
            println!("Generated {} record(s)", records.len());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_show_param(common: &CommonArgs, key: &str) {
    match params::show_param(&common.process_dir, &common.file_filter, key) {
        Ok(values) => {
            for value in values {
                println!("{}", value.line());
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_set_param(common: &CommonArgs, key: &str) {
    let mut prompter = TerminalPrompter::new();
    let result = params::set_param(
        &common.process_dir,
        &common.file_filter,
        key,
        &mut prompter,
        common.debug,
    );
    report_params(result);
}

fn run_update_param(common: &CommonArgs, key: &str, value: &str) {
    let result = params::update_param(
        &common.process_dir,
        &common.file_filter,
        key,
        value,
        common.debug,
    );
    report_params(result);
}

fn report_params(result: Result<ParamReport, params::ParamError>) {
    match result {
        Ok(report) => {
            println!("Updated {} record(s), skipped {}", report.changed, report.skipped);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_publish(
    common: &CommonArgs,
    phases: &[PublishPhase],
    mode: PublishMode,
    no_proxy: bool,
    log_file: Option<PathBuf>,
) {
    let resolver = load_resolver(common);
    let connection = CatalogConnection::from_resolver(&resolver).with_no_proxy(no_proxy);

    let password = match read_password(&connection.user) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error reading password: {}", e);
            process::exit(1);
        }
    };
    let debug = common.debug || password.is_empty();
    let connection = connection.with_password(password);

    let context = RunContext::new(common.process_dir.clone(), connection)
        .with_mode(mode)
        .with_debug(debug);

    info!(
        debug = context.debug,
        mode = %context.mode,
        process_dir = %context.process_dir.display(),
        host = %context.connection.host,
        instance = %context.connection.instance,
        user = %context.connection.user,
        password = %context.connection.redacted_password(),
        coverage_root_dir = %context.connection.coverage_root_dir,
        "Publish settings"
    );
    if phases.is_empty() {
        warn!("Nothing selected; use --pub-stores, --pub-coverages or --set-layeroptions");
    }

    let records = match record_files(&context.process_dir, &common.file_filter) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    for path in &records {
        tracing::debug!(path = %path.display(), "Record to process");
    }

    let transport: Box<dyn CatalogTransport> = if context.debug {
        Box::new(DryRunTransport::for_connection(&context.connection))
    } else {
        match HttpTransport::new(&context.connection) {
            Ok(t) => Box::new(t),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    };

    let mut publisher = Publisher::new(&context, transport.as_ref());
    publisher.run(phases, &records);
    let log = publisher.into_log();

    println!("Log:");
    for line in log.lines() {
        println!("{}", line);
    }

    if let Some(path) = log_file {
        let report = RunReport::from_log(&log, context.mode, context.debug);
        if let Err(e) = report.save(&path) {
            eprintln!("Error writing log file {}: {}", path.display(), e);
        }
    }

    println!("\nDone.");
}

/// Resolver over the global and session tiers of a process directory
fn load_resolver(common: &CommonArgs) -> ConfigResolver {
    let global_path = match &common.global_config {
        Some(path) => path.clone(),
        None => match default_global_config_path() {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Using {} from the current directory", GLOBAL_FILE_NAME);
                PathBuf::from(GLOBAL_FILE_NAME)
            }
        },
    };

    let global = load_tier(TierKind::Global, &global_path);
    let session = load_tier(TierKind::Session, &session_path(&common.process_dir));
    ConfigResolver::new(session, global)
}

fn load_tier(kind: TierKind, path: &Path) -> ConfigTier {
    match ConfigTier::load(kind, path) {
        Ok(tier) => tier,
        Err(e) => {
            eprintln!("Error loading {} defaults: {}", kind, e);
            process::exit(1);
        }
    }
}

fn read_password(user: &str) -> Result<String, geopublish::prompt::PromptError> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    let mut prompter = TerminalPrompter::new();
    prompter.ask_secret(&format!(
        "Catalog password for {} (empty => debugging mode)",
        user
    ))
}
