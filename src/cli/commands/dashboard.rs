use serde_json::json;

use crate::cli::utils::output_transactions;
use crate::cli::{config, enter, OutputFormat};
use crate::client::{Route, Summary, TransactionsClient};

pub async fn handle(api: &TransactionsClient, recent: usize, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut store = config::session_store()?;
    enter(&mut store, Route::Dashboard).await?;

    let transactions = api.list(None).await?;
    let summary = Summary::from_transactions(&transactions)?;
    let latest = &transactions[..recent.min(transactions.len())];

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "user": store.user(),
                    "summary": summary,
                    "recent": latest,
                }))?
            );
        }
        OutputFormat::Text => {
            if let Some(user) = store.user() {
                println!("Hello, {}", user.display_name);
                println!();
            }
            println!("Income:   {:>12}", summary.income.round_dp(2));
            println!("Expenses: {:>12}", summary.expense.round_dp(2));
            println!("Balance:  {:>12}", summary.balance.round_dp(2));
            println!("({} transactions)", summary.count);
            println!();
            output_transactions(&output_format, latest)?;
        }
    }
    Ok(())
}
