use crate::cli::commands::{auth, dashboard, tx};
use crate::cli::{config, navigate, OutputFormat};
use crate::client::{Navigation, Route, TransactionsClient};

/// Show whichever view the guard lets the user reach from `path`
pub async fn handle(path: &str, api: &TransactionsClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut store = config::session_store()?;
    let navigation = navigate(&mut store, path).await?;

    if let (Navigation::Redirect(to), OutputFormat::Text) = (navigation, &output_format) {
        eprintln!("{} -> {}", path, to.path());
    }

    match navigation.route() {
        Route::Login => auth::handle(auth::AuthCommands::Login, output_format).await,
        Route::Dashboard => dashboard::handle(api, 5, output_format).await,
        Route::Transactions => tx::handle(tx::TxCommands::List { mine: false }, api, output_format).await,
    }
}
