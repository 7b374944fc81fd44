use crate::amount::{coerce_amount, multiply_or_zero};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

///
/// One product entry within one recorded purchase.
///
/// All fields are kept as entered. Nothing is validated or normalized here;
/// see [`PurchaseLineRecord::key`] and the numeric accessors.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLineRecord {
    #[serde(alias = "name")]
    pub product_name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub price: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub quantity: String,
    #[serde(default)]
    pub store: String,
    #[serde(default, alias = "date")]
    pub date_text: String,
    #[serde(default)]
    pub category: String,
}

impl PurchaseLineRecord {
    pub fn new(
        product_name: &str,
        price: &str,
        quantity: &str,
        store: &str,
        date_text: &str,
    ) -> PurchaseLineRecord {
        PurchaseLineRecord {
            product_name: product_name.to_string(),
            price: price.to_string(),
            quantity: quantity.to_string(),
            store: store.to_string(),
            date_text: date_text.to_string(),
            category: String::new(),
        }
    }

    pub fn with_category(mut self, category: &str) -> PurchaseLineRecord {
        self.category = category.to_string();
        self
    }

    /// Grouping key: lowercased and trimmed product name.
    ///
    /// Names that differ in anything besides case and surrounding whitespace
    /// stay distinct products.
    pub fn key(&self) -> String {
        product_key(&self.product_name)
    }

    pub fn price_value(&self) -> Decimal {
        coerce_amount(&self.price)
    }

    pub fn quantity_value(&self) -> Decimal {
        coerce_amount(&self.quantity)
    }

    /// Zero when the product overflows.
    pub fn line_total(&self) -> Decimal {
        multiply_or_zero(self.price_value(), self.quantity_value())
    }
}

impl fmt::Display for PurchaseLineRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} x {} @ {}",
            self.date_text, self.quantity, self.product_name, self.price
        )?;
        if !self.store.is_empty() {
            write!(f, " ({})", self.store)?;
        }
        Ok(())
    }
}

pub fn product_key(product_name: &str) -> String {
    product_name.to_lowercase().trim().to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
    Null(()),
}

/// Older app versions stored prices and quantities as JSON numbers.
pub(crate) fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(number) => number.to_string(),
        TextOrNumber::Null(()) => String::new(),
    })
}
