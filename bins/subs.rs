use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use common::api::ApiClient;
use configs::{AppConfig, LogFormat};
use dotenvy::dotenv;
use owo_colors::OwoColorize;
use service::forms::{LoginForm, RegisterForm, SearchForm, ServiceForm, SubscriptionForm, UserForm};
use service::session::FileSessionStore;
use service::view::{user_id_label, OutputArea, Rendered, View};
use service::{Controller, Outcome};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "subs")]
#[command(about = "Console client for the users, services and subscriptions API", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file; defaults to CONFIG_PATH or ./config.toml
    #[arg(long, global = true)]
    config: Option<String>,

    /// Overrides api.base_url and API_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Register {
        #[arg(long, default_value_t)]
        email: String,
        #[arg(long, default_value_t)]
        password: String,
        #[arg(long, default_value_t)]
        first_name: String,
        #[arg(long, default_value_t)]
        last_name: String,
    },
    Login {
        #[arg(long, default_value_t)]
        email: String,
        #[arg(long, default_value_t)]
        password: String,
    },
    /// Forget the logged-in user
    Logout,
    /// Print the logged-in user id
    Whoami,
    Search {
        #[arg(long, default_value_t)]
        email: String,
        #[arg(long, default_value_t)]
        first_name: String,
        #[arg(long, default_value_t)]
        last_name: String,
    },
    Users {
        #[command(subcommand)]
        action: UserCommand,
    },
    Services {
        #[command(subcommand)]
        action: ServiceCommand,
    },
    Subs {
        #[command(subcommand)]
        action: SubscriptionCommand,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    List,
    Get {
        #[arg(long)]
        user_id: Option<String>,
    },
    Update {
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long, default_value_t)]
        email: String,
        #[arg(long, default_value_t)]
        first_name: String,
        #[arg(long, default_value_t)]
        last_name: String,
        #[arg(long, default_value_t)]
        password: String,
    },
    Delete {
        #[arg(long)]
        user_id: Option<String>,
    },
}

#[derive(Subcommand)]
enum ServiceCommand {
    List,
    Get {
        #[arg(long, default_value_t)]
        service_id: String,
    },
}

#[derive(Subcommand)]
enum SubscriptionCommand {
    List {
        #[arg(long)]
        user_id: Option<String>,
    },
    Get {
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long, default_value_t)]
        service_id: String,
    },
    Add {
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long, default_value_t)]
        service_id: String,
        #[arg(long, default_value_t)]
        start_date: String,
        #[arg(long, default_value_t)]
        end_date: String,
        #[arg(long, default_value = "1")]
        active: String,
    },
    Update {
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long, default_value_t)]
        service_id: String,
        #[arg(long, default_value_t)]
        end_date: String,
        #[arg(long, default_value_t)]
        active: String,
    },
    Delete {
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long, default_value_t)]
        service_id: String,
    },
}

/// Responses on stdout, red when they are errors; the user slot on stderr.
struct TerminalView;

impl View for TerminalView {
    fn render(&self, area: OutputArea, output: &Rendered) {
        if output.is_error() {
            println!("[{}]\n{}", area, output.text.red());
        } else {
            println!("[{}]\n{}", area, output.text);
        }
    }

    fn show_user_id(&self, user_id: Option<i64>) {
        eprintln!("{} {}", "Logged in user:".dimmed(), user_id_label(user_id));
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut cfg = match &cli.config {
        Some(path) => AppConfig::load_and_validate_from(path),
        None => AppConfig::load_and_validate(),
    }
    .context("failed to load configuration")?;
    if let Some(url) = &cli.base_url {
        cfg.api.base_url = url.clone();
        cfg.validate().context("invalid --base-url")?;
    }
    Ok(cfg)
}

fn init_logging(cfg: &AppConfig) {
    match cfg.logging.format {
        LogFormat::Compact => common::utils::logging::init_logging_default(&cfg.logging.filter),
        LogFormat::Json => common::utils::logging::init_logging_json(&cfg.logging.filter),
    }
}

/// Fill a missing `--user-id` from the session.
async fn user_or_session(controller: &Controller, user_id: Option<String>) -> String {
    match user_id {
        Some(id) => id,
        None => controller.session().user_id().await.map(|id| id.to_string()).unwrap_or_default(),
    }
}

async fn dispatch(controller: &Controller, command: Commands) -> Outcome {
    match command {
        Commands::Register { email, password, first_name, last_name } => {
            controller.register_user(&RegisterForm { email, password, first_name, last_name }).await
        }
        Commands::Login { email, password } => controller.login(&LoginForm { email, password }).await,
        Commands::Logout => controller.logout().await,
        Commands::Whoami => {
            println!("{}", user_id_label(controller.session().user_id().await));
            Outcome::Succeeded
        }
        Commands::Search { email, first_name, last_name } => {
            controller.search_users(&SearchForm { email, first_name, last_name }).await
        }
        Commands::Users { action } => match action {
            UserCommand::List => controller.list_users().await,
            UserCommand::Get { user_id } => {
                let form = UserForm::for_user(user_or_session(controller, user_id).await);
                controller.get_user(&form).await
            }
            UserCommand::Update { user_id, email, first_name, last_name, password } => {
                let form = UserForm {
                    user_id: user_or_session(controller, user_id).await,
                    email,
                    first_name,
                    last_name,
                    password,
                };
                controller.update_user(&form).await
            }
            UserCommand::Delete { user_id } => {
                let form = UserForm::for_user(user_or_session(controller, user_id).await);
                controller.delete_user(&form).await
            }
        },
        Commands::Services { action } => match action {
            ServiceCommand::List => controller.list_services().await,
            ServiceCommand::Get { service_id } => controller.get_service(&ServiceForm { service_id }).await,
        },
        Commands::Subs { action } => match action {
            SubscriptionCommand::List { user_id } => {
                let form = SubscriptionForm::for_user(user_or_session(controller, user_id).await);
                controller.list_subscriptions(&form).await
            }
            SubscriptionCommand::Get { user_id, service_id } => {
                let form = SubscriptionForm {
                    service_id,
                    ..SubscriptionForm::for_user(user_or_session(controller, user_id).await)
                };
                controller.get_subscription(&form).await
            }
            SubscriptionCommand::Add { user_id, service_id, start_date, end_date, active } => {
                let form = SubscriptionForm {
                    user_id: user_or_session(controller, user_id).await,
                    service_id,
                    start_date,
                    end_date,
                    active,
                };
                controller.add_subscription(&form).await
            }
            SubscriptionCommand::Update { user_id, service_id, end_date, active } => {
                let form = SubscriptionForm {
                    service_id,
                    end_date,
                    active,
                    ..SubscriptionForm::for_user(user_or_session(controller, user_id).await)
                };
                controller.update_subscription(&form).await
            }
            SubscriptionCommand::Delete { user_id, service_id } => {
                let form = SubscriptionForm {
                    service_id,
                    ..SubscriptionForm::for_user(user_or_session(controller, user_id).await)
                };
                controller.delete_subscription(&form).await
            }
        },
    }
}

async fn run(cfg: AppConfig, command: Commands) -> anyhow::Result<Outcome> {
    let store = FileSessionStore::open(&cfg.session.store_path, cfg.session.key.clone())
        .await
        .with_context(|| format!("failed to open session store {}", cfg.session.store_path))?;
    let api = ApiClient::new(cfg.api.base_url.clone()).context("failed to build http client")?;
    let controller = Controller::new(api, store, Arc::new(TerminalView));
    controller.startup().await;
    Ok(dispatch(&controller, command).await)
}

fn main() -> ExitCode {
    // .env first so RUST_LOG, API_BASE_URL and friends are visible
    dotenv().ok();
    let cli = Cli::parse();

    let cfg = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default("warn");
            error!(event = "config_invalid", error = %format!("{e:#}"), "cannot start");
            eprintln!("{}", format!("{e:#}").red());
            return ExitCode::FAILURE;
        }
    };
    init_logging(&cfg);

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(event = "start", base_url = %cfg.api.base_url, version = env!("CARGO_PKG_VERSION"), "subs starting");
    match rt.block_on(run(cfg, cli.command)) {
        Ok(Outcome::Succeeded) => ExitCode::SUCCESS,
        Ok(Outcome::Rejected) => ExitCode::from(2),
        Ok(Outcome::Failed) => ExitCode::FAILURE,
        Err(e) => {
            error!(event = "run_failed", error = %format!("{e:#}"), "subs failed");
            eprintln!("{}", format!("{e:#}").red());
            ExitCode::FAILURE
        }
    }
}
