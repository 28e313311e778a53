//! Confirmation view of a placed order.

use crate::types::{OrderRecord, ToppingKind};
use std::collections::BTreeSet;
use std::fmt;

/// Shown under the rows so the customer knows what to do next
pub const RECEIPT_FOOTER: &str =
    "Show this screen to the barista when you reach the counter. We'll text you when it's ready.";

/// One labelled line of the receipt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiptRow {
    /// Row label
    pub label: &'static str,
    /// Row value
    pub value: String,
}

/// Receipt rendered after a successful submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Greeting addressed to the pickup name
    pub greeting: String,
    /// Rows in display order
    pub rows: Vec<ReceiptRow>,
}

impl Receipt {
    /// Looks up a row value by label
    #[must_use]
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

/// Topping display names in menu order, or `None` when there are none
#[must_use]
pub fn describe_toppings(toppings: &BTreeSet<ToppingKind>) -> String {
    if toppings.is_empty() {
        return "None".to_string();
    }
    toppings
        .iter()
        .map(|topping| topping.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<&OrderRecord> for Receipt {
    fn from(record: &OrderRecord) -> Self {
        let row = |label, value: String| ReceiptRow { label, value };
        Self {
            greeting: format!("Thanks, {}, we got your order.", record.name.trim()),
            rows: vec![
                row("Order ID", record.order_id.to_string()),
                row("Pickup Name", record.name.clone()),
                row("Phone", record.phone.clone()),
                row("Base", record.base.display_name().to_string()),
                row("Milk", record.milk.display_name().to_string()),
                row("Toppings", describe_toppings(&record.toppings)),
            ],
        }
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.rows.iter().map(|row| row.label.len()).max().unwrap_or(0);

        writeln!(f, "{}", self.greeting)?;
        writeln!(f)?;
        for row in &self.rows {
            writeln!(f, "  {:<width$}  {}", row.label, row.value)?;
        }
        writeln!(f)?;
        write!(f, "{RECEIPT_FOOTER}")
    }
}
