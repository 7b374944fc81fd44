use crate::date::DateResolver;
use crate::error::Result;
use crate::record::{text_or_number, PurchaseLineRecord};
use serde::{Deserialize, Serialize};

/// One recorded shopping trip, as the app stores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub items: Vec<PurchaseItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    #[serde(alias = "productName")]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub price: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub quantity: String,
    #[serde(default)]
    pub category: String,
}

impl Purchase {
    /// Purchase-line records of this purchase; every line inherits the
    /// purchase's store and date.
    pub fn lines(&self) -> Vec<PurchaseLineRecord> {
        self.items
            .iter()
            .map(|item| PurchaseLineRecord {
                product_name: item.name.clone(),
                price: item.price.clone(),
                quantity: item.quantity.clone(),
                store: self.store.clone(),
                date_text: self.date.clone(),
                category: item.category.clone(),
            })
            .collect()
    }

    /// Rewrites `date` as `DD/MM/YYYY` when it is recognized.
    ///
    /// Returns `true` when the stored text changed and should be written back.
    pub fn normalize_dates(&mut self, resolver: &DateResolver) -> bool {
        match resolver.normalize(&self.date) {
            Some(normalized) if normalized != self.date => {
                self.date = normalized;
                true
            }
            _ => false,
        }
    }
}

pub fn flatten_purchases(purchases: &[Purchase]) -> Vec<PurchaseLineRecord> {
    let mut records = Vec::new();

    for purchase in purchases {
        records.append(&mut purchase.lines());
    }

    records
}

pub fn load_purchases_json(input: &str) -> Result<Vec<Purchase>> {
    Ok(serde_json::from_str(input)?)
}

pub fn load_records_json(input: &str) -> Result<Vec<PurchaseLineRecord>> {
    Ok(serde_json::from_str(input)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::NaiveDate;

    const PURCHASES: &str = r#"[
        {
            "id": "p1",
            "store": "Lidl",
            "date": "2024-01-15",
            "items": [
                {"name": "Milk", "price": "3.20", "quantity": "2", "category": "Dairy"},
                {"name": "Bread", "price": 4.5, "quantity": 1}
            ]
        },
        {
            "store": "Biedronka",
            "date": "20/01/2024",
            "items": [
                {"name": "milk", "price": "3.00", "quantity": "1", "category": "Dairy"}
            ]
        }
    ]"#;

    #[test]
    fn test_flatten_purchases() {
        let purchases = load_purchases_json(PURCHASES).unwrap();
        let records = flatten_purchases(&purchases);

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            PurchaseLineRecord::new("Milk", "3.20", "2", "Lidl", "2024-01-15").with_category("Dairy")
        );
        assert_eq!(records[1].price, "4.5");
        assert_eq!(records[1].store, "Lidl");
        assert_eq!(records[2].store, "Biedronka");
        assert_eq!(records[2].date_text, "20/01/2024");
    }

    #[test]
    fn test_normalize_dates() {
        let resolver = DateResolver::new(1900, 2099, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let mut purchases = load_purchases_json(PURCHASES).unwrap();

        assert!(purchases[0].normalize_dates(&resolver));
        assert_eq!(purchases[0].date, "15/01/2024");
        assert!(!purchases[1].normalize_dates(&resolver));

        let mut unknown = Purchase {
            date: "someday".to_string(),
            ..Purchase::default()
        };
        assert!(!unknown.normalize_dates(&resolver));
        assert_eq!(unknown.date, "someday");
    }

    #[test]
    fn test_load_records_json() {
        let records = load_records_json(
            r#"[{"productName":"Milk","price":"100","quantity":"1","store":"A","dateText":"01/01/2024"}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key(), "milk");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(load_records_json("{not json"), Err(Error::Json(_))));
        assert!(matches!(load_purchases_json("[1, 2]"), Err(Error::Json(_))));
    }
}
