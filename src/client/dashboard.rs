use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::database::models::{Transaction, TransactionType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Totals overflow the decimal range")]
pub struct SummaryOverflow;

/// Totals shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    pub count: usize,
}

impl Summary {
    /// Amounts are summed as stored; a negative `income` lowers the income total.
    pub fn from_transactions(transactions: &[Transaction]) -> Result<Self, SummaryOverflow> {
        let mut summary = Summary::default();
        for tx in transactions {
            let total = match tx.kind {
                TransactionType::Income => &mut summary.income,
                TransactionType::Expense => &mut summary.expense,
            };
            *total = total.checked_add(tx.amount).ok_or(SummaryOverflow)?;
        }
        summary.balance = summary
            .income
            .checked_sub(summary.expense)
            .ok_or(SummaryOverflow)?;
        summary.count = transactions.len();
        Ok(summary)
    }
}
