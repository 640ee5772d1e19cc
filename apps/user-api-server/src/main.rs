use anyhow::Result;
use clap::{Parser, Subcommand};
use modkit::{run, RegistryBuilder, RunOptions, ShutdownOptions};
use runtime::{AppConfig, AppConfigProvider, CliArgs};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// Adapter to make AppConfigProvider implement modkit::ConfigProvider
struct ModkitConfigAdapter(Arc<AppConfigProvider>);

impl modkit::ConfigProvider for ModkitConfigAdapter {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.get_module_config(module_name)
    }
}

/// User API Server - CRUD service over an in-memory user store
#[derive(Parser)]
#[command(name = "user-api-server")]
#[command(about = "User API Server - CRUD service over an in-memory user store")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);
    derive_ingress_section(&mut config);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    let base_dir = cli
        .config
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new("."));
    runtime::logging::init_logging_from_config(
        &logging_config,
        base_dir,
        config.server.is_production(),
    );
    tracing::info!(
        environment = %config.server.environment,
        "User API Server starting"
    );

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

/// Fill `modules.api_ingress` from the `server` section where the operator
/// left it unset.
fn derive_ingress_section(config: &mut AppConfig) {
    let bind_addr = config.server.bind_addr();
    let timeout = config.server.timeout_sec;

    let section = config
        .modules
        .entry("api_ingress".to_string())
        .or_insert_with(|| serde_json::json!({}));

    if let Some(obj) = section.as_object_mut() {
        obj.entry("bind_addr")
            .or_insert_with(|| serde_json::Value::from(bind_addr));
        if timeout > 0 {
            obj.entry("request_timeout_secs")
                .or_insert_with(|| serde_json::Value::from(timeout));
        }
    }
}

fn build_registry() -> Result<modkit::ModuleRegistry> {
    let ingress = Arc::new(api_ingress::ApiIngress::default());
    let users = Arc::new(users_info::UsersInfo::default());

    // Registration order is init/start order; stop runs in reverse.
    let mut b = RegistryBuilder::default();
    b.register_core("api_ingress", ingress.clone());
    b.register_rest_host("api_ingress", ingress.clone());
    b.register_stateful("api_ingress", ingress);
    b.register_core("users_info", users.clone());
    b.register_rest("users_info", users);

    Ok(b.build()?)
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");

    let config_provider = Arc::new(ModkitConfigAdapter(Arc::new(AppConfigProvider::new(
        config,
    ))));

    let run_options = RunOptions {
        modules_cfg: config_provider,
        registry: build_registry()?,
        shutdown: ShutdownOptions::Signals,
    };

    run(run_options).await
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    build_registry()?;

    // Module sections are typed at init; parse them here too
    let ingress: api_ingress::ApiIngressConfig = section_or_default(&config, "api_ingress")?;
    ingress
        .bind_addr
        .parse::<std::net::SocketAddr>()
        .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", ingress.bind_addr, e))?;
    let _users: users_info::config::UsersInfoConfig = section_or_default(&config, "users_info")?;

    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

fn section_or_default<T>(config: &AppConfig, name: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match config.modules.get(name) {
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| anyhow::anyhow!("invalid {name} config: {e}")),
        None => Ok(T::default()),
    }
}
