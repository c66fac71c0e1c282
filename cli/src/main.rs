use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use crm_cli::commands::{self, ListOptions};
use crm_cli::{browse, CliConfig, CliError, TokenStore, UreqTransport};
use crm_core::{CrmApi, PageSize, Resource, ResourcePage};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crm")]
#[command(about = "CRM records from the command line")]
struct Cli {
    /// API base URL [env: CRM_BASE_URL] [default: https://localhost:5026]
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Where the access token is kept [env: CRM_TOKEN_FILE] [default: .crm-token]
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,
    /// Request timeout in seconds, 0 for none [env: CRM_TIMEOUT]
    #[arg(long, global = true)]
    timeout: Option<u64>,
    /// -v for info, -vv for debug, -vvv for trace. RUST_LOG wins when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the access token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Check the stored token with the server
    Validate,
    /// List resource types and their fields
    Resources,
    /// List records, one page at a time
    List {
        resource: Resource,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = PageSize::Five)]
        page_size: PageSize,
        #[arg(long)]
        json: bool,
    },
    /// Show one record
    Get {
        resource: Resource,
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Create a record from FIELD=VALUE pairs
    Create {
        resource: Resource,
        fields: Vec<String>,
    },
    /// Change the given fields of a record, keeping the rest
    Update {
        resource: Resource,
        id: i64,
        fields: Vec<String>,
    },
    /// Delete a record
    Delete { resource: Resource, id: i64 },
    /// Page through records interactively
    Browse { resource: Resource },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = CliConfig::from_env(cli.base_url, cli.token_file, cli.timeout);
    tracing::debug!(
        base_url = %config.base_url,
        token_file = %config.token_file.display(),
        timeout = ?config.timeout,
        "configuration"
    );
    let api = CrmApi::new(&config.base_url, UreqTransport::with_timeout(config.timeout));
    let store = TokenStore::new(&config.token_file);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Login { email, password } => commands::login(&api, &store, &email, &password, &mut out),
        Command::Register { email, password } => commands::register(&api, &email, &password, &mut out),
        Command::Logout => commands::logout(&store, &mut out),
        Command::Validate => commands::validate(&api, &store, &mut out),
        Command::Resources => commands::resources(&mut out),
        Command::List {
            resource,
            page,
            page_size,
            json,
        } => {
            let options = ListOptions { page, page_size, json };
            commands::list(&api, &store.require()?, resource, options, &mut out)
        }
        Command::Get { resource, id, json } => commands::get(&api, &store.require()?, resource, id, json, &mut out),
        Command::Create { resource, fields } => commands::create(&api, &store.require()?, resource, &fields, &mut out),
        Command::Update { resource, id, fields } => {
            commands::update(&api, &store.require()?, resource, id, &fields, &mut out)
        }
        Command::Delete { resource, id } => commands::delete(&api, &store.require()?, resource, id, &mut out),
        Command::Browse { resource } => {
            let mut page = ResourcePage::open(&api, resource, store.load()?);
            browse::run(&api, &mut page, io::stdin().lock(), &mut out)
        }
    }?;
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
