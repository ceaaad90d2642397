use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::database::models::Transaction;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a non-fatal warning in the appropriate format
pub fn output_warning(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "warning": message }))?);
        }
        OutputFormat::Text => {
            eprintln!("Warning: {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

pub fn output_transactions(output_format: &OutputFormat, transactions: &[Transaction]) -> anyhow::Result<()> {
    if transactions.is_empty() {
        return output_empty_collection(output_format, "transactions", "No transactions");
    }

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "transactions": transactions }))?);
        }
        OutputFormat::Text => {
            println!("{:<38} {:<12} {:<8} {:>12} {}", "ID", "DATE", "TYPE", "AMOUNT", "TITLE");
            println!("{}", "-".repeat(90));
            for tx in transactions {
                println!(
                    "{:<38} {:<12} {:<8} {:>12} {}",
                    tx.id,
                    tx.date.format("%Y-%m-%d"),
                    tx.kind,
                    tx.amount.round_dp(2),
                    tx.title
                );
            }
        }
    }
    Ok(())
}

pub fn output_transaction(output_format: &OutputFormat, transaction: &Transaction) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(transaction)?);
        }
        OutputFormat::Text => {
            println!("ID:     {}", transaction.id);
            println!("Title:  {}", transaction.title);
            println!("Type:   {}", transaction.kind);
            println!("Amount: {}", transaction.amount.round_dp(2));
            println!("Date:   {}", transaction.date.format("%Y-%m-%d %H:%M"));
            if !transaction.notes.is_empty() {
                println!("Notes:  {}", transaction.notes);
            }
        }
    }
    Ok(())
}
