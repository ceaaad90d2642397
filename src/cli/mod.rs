pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::client::{guard, AuthProvider, Navigation, Route, SessionStore, TransactionsClient};

#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Fintrack CLI - sign in and manage your income and expenses")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "FINTRACK_API_URL",
        default_value = config::DEFAULT_API_URL,
        help = "Transaction resource URL"
    )]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, sign out and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Transaction operations")]
    Tx {
        #[command(subcommand)]
        cmd: commands::tx::TxCommands,
    },

    #[command(about = "Income, expense and balance totals")]
    Dashboard {
        #[arg(long, default_value_t = 5, help = "Number of recent transactions to show")]
        recent: usize,
    },

    #[command(about = "Open a client view by path, e.g. / or /transactions")]
    Open {
        #[arg(help = "View path")]
        path: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Run the navigation guard for a view and fail unless it may be shown
pub async fn enter<P: AuthProvider>(store: &mut SessionStore<P>, route: Route) -> anyhow::Result<()> {
    match guard(store, route).await {
        Navigation::Proceed(_) => Ok(()),
        Navigation::Redirect(Route::Login) => {
            anyhow::bail!("Not signed in. Run `fintrack auth login` first")
        }
        Navigation::Redirect(other) => {
            anyhow::bail!("{} is not available, continue at {}", route.path(), other.path())
        }
    }
}

/// Resolve a path to its view and run the guard on it
pub async fn navigate<P: AuthProvider>(store: &mut SessionStore<P>, path: &str) -> anyhow::Result<Navigation> {
    let route = Route::resolve(path).ok_or_else(|| anyhow::anyhow!("No view at {}", path))?;
    Ok(guard(store, route).await)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let api = TransactionsClient::new(&cli.api_url)?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Tx { cmd } => commands::tx::handle(cmd, &api, output_format).await,
        Commands::Dashboard { recent } => commands::dashboard::handle(&api, recent, output_format).await,
        Commands::Open { path } => commands::open::handle(&path, &api, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::session::tests::FakeProvider;

    #[tokio::test]
    async fn enter_requires_a_session() {
        let mut store = SessionStore::new(FakeProvider::default(), "http://localhost:5173");
        let err = enter(&mut store, Route::Transactions).await.unwrap_err();
        assert!(err.to_string().contains("fintrack auth login"));

        let mut store = SessionStore::new(FakeProvider::with_user(None, None), "http://localhost:5173");
        assert!(enter(&mut store, Route::Transactions).await.is_ok());
    }

    #[tokio::test]
    async fn navigate_resolves_then_guards() {
        let mut store = SessionStore::new(FakeProvider::default(), "http://localhost:5173");
        assert!(navigate(&mut store, "/settings").await.is_err());

        let navigation = navigate(&mut store, "/").await.unwrap();
        assert_eq!(navigation, Navigation::Redirect(Route::Login));
        assert_eq!(navigation.route(), Route::Login);

        let mut store = SessionStore::new(FakeProvider::with_user(None, None), "http://localhost:5173");
        let navigation = navigate(&mut store, "/transactions/").await.unwrap();
        assert_eq!(navigation, Navigation::Proceed(Route::Transactions));
        assert_eq!(navigation.route(), Route::Transactions);
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fintrack",
            "tx",
            "list",
            "--json",
            "--api-url",
            "http://api.test/transactions",
        ])
        .unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        assert_eq!(cli.api_url, "http://api.test/transactions");
    }
}
