use clap::{Parser, Subcommand};
use doctrans::{
    commands::{
        config::{self, ConfigAction},
        connection::{self, TestConnectionCommand},
        engine::{self, EngineAction},
        runtime,
        translate::{self, TranslateCommand},
    },
    GlobalOpts,
};
use doctrans_logger as logger;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "doctrans")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Document translator",
    long_about = "doctrans translates office documents by running the bundled Python translation scripts."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a document
    Translate(TranslateCommand),
    /// Check that an engine is reachable with the saved settings
    TestConnection(TestConnectionCommand),
    /// Show the Python runtime the translation scripts would run under
    Runtime,
    /// Configure doctrans
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Manage engine connection settings
    #[command(subcommand)]
    Engine(EngineAction),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DOCTRANS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    // Ignore the error if a subscriber was already installed
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), cli.global.log_script)
    {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    let result = match cli.command {
        Commands::Translate(cmd) => translate::handle_translate(cmd),
        Commands::TestConnection(cmd) => connection::handle_test_connection(cmd),
        Commands::Runtime => runtime::handle_runtime(),
        Commands::Config { action } => config::handle_config(action, &cli.global),
        Commands::Engine(action) => engine::handle_engine(action),
    };

    if let Err(e) = result {
        logger::error(&e.to_string());
        logger::show_log_path();
        std::process::exit(1);
    }
}
