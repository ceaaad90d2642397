use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use crate::cli::utils::{output_success, output_transaction, output_transactions};
use crate::cli::{config, enter, OutputFormat};
use crate::client::{Route, TransactionDraft, TransactionsClient};
use crate::database::models::TransactionType;

#[derive(Subcommand)]
pub enum TxCommands {
    #[command(about = "List transactions, newest first")]
    List {
        #[arg(long, help = "Only transactions owned by the signed-in user")]
        mine: bool,
    },

    #[command(about = "Show one transaction")]
    Get {
        #[arg(help = "Transaction ID")]
        id: String,
    },

    #[command(about = "Record a new transaction")]
    Add {
        #[arg(long, help = "Short description")]
        title: String,
        #[arg(long, help = "Amount, e.g. 19.90")]
        amount: Decimal,
        #[arg(long = "type", help = "income or expense")]
        kind: TransactionType,
        #[arg(long, help = "Date (RFC 3339 or YYYY-MM-DD), defaults to now")]
        date: Option<String>,
        #[arg(long, help = "Free-form notes")]
        notes: Option<String>,
    },

    #[command(about = "Change fields of a transaction")]
    Update {
        #[arg(help = "Transaction ID")]
        id: String,
        #[command(flatten)]
        fields: UpdateFields,
    },

    #[command(about = "Delete a transaction")]
    Delete {
        #[arg(help = "Transaction ID")]
        id: String,
    },
}

#[derive(Args)]
pub struct UpdateFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub amount: Option<Decimal>,
    #[arg(long = "type")]
    pub kind: Option<TransactionType>,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long, help = "New notes; pass an empty string to clear")]
    pub notes: Option<String>,
}

impl From<UpdateFields> for TransactionDraft {
    fn from(fields: UpdateFields) -> Self {
        TransactionDraft {
            title: fields.title,
            amount: fields.amount,
            kind: fields.kind,
            date: fields.date,
            notes: fields.notes,
            user_id: None,
        }
    }
}

pub async fn handle(cmd: TxCommands, api: &TransactionsClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut store = config::session_store()?;
    enter(&mut store, Route::Transactions).await?;

    match cmd {
        TxCommands::List { mine } => {
            let owner = if mine { store.user().map(|u| u.id.as_str()) } else { None };
            let transactions = api.list(owner).await?;
            output_transactions(&output_format, &transactions)
        }
        TxCommands::Get { id } => {
            let transaction = api.get(&id).await?;
            output_transaction(&output_format, &transaction)
        }
        TxCommands::Add { title, amount, kind, date, notes } => {
            let draft = TransactionDraft {
                title: Some(title),
                amount: Some(amount),
                kind: Some(kind),
                date,
                notes,
                user_id: store.user().map(|u| u.id.clone()),
            };
            let transaction = api.create(&draft).await?;
            output_transaction(&output_format, &transaction)
        }
        TxCommands::Update { id, fields } => {
            let transaction = api.update(&id, &fields.into()).await?;
            output_transaction(&output_format, &transaction)
        }
        TxCommands::Delete { id } => {
            api.delete(&id).await?;
            output_success(&output_format, &format!("Deleted transaction {}", id), None)
        }
    }
}
