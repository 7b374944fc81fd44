use crate::date::DateResolver;
use crate::error::{Error, Result};
use crate::options::ConsolidationOptions;
use crate::record::{product_key, PurchaseLineRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;

#[derive(Eq, PartialEq, Hash, Clone, Debug)]
pub struct ProductAtStore {
    pub product_key: String,
    pub store_name: String,
}

impl ProductAtStore {
    pub fn new(product_name: &str, store_name: &str) -> ProductAtStore {
        ProductAtStore {
            product_key: product_key(product_name),
            store_name: store_name.trim().to_string(),
        }
    }
}

/// Prices of one product at one store, keyed by date.
#[derive(Debug, Default)]
pub struct StorePrices {
    pub table: BTreeMap<NaiveDate, Decimal>,
}

impl StorePrices {
    fn new() -> StorePrices {
        StorePrices {
            table: BTreeMap::new(),
        }
    }

    fn get_price(&self, date: NaiveDate) -> Option<Decimal> {
        self.table
            .range(..=date)
            .next_back()
            .map(|(_, price)| *price)
    }

    fn latest(&self) -> Option<(NaiveDate, Decimal)> {
        self.table
            .iter()
            .next_back()
            .map(|(date, price)| (*date, *price))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePrice {
    pub store: String,
    pub price: Decimal,
    pub date: NaiveDate,
}

/// Price comparison across stores.
///
/// Two records for the same product, store and date: the later one wins.
#[derive(Debug)]
pub struct PriceComparison {
    pub prices: HashMap<ProductAtStore, StorePrices>,
}

impl PriceComparison {
    pub fn load(records: &[PurchaseLineRecord], options: &ConsolidationOptions) -> PriceComparison {
        let resolver = options.resolver();
        let mut result = PriceComparison {
            prices: HashMap::new(),
        };

        result.add_records(records, &resolver);

        result
    }

    pub fn get_price(&self, product_name: &str, store_name: &str, date: NaiveDate) -> Result<Decimal> {
        let product_at_store = ProductAtStore::new(product_name, store_name);

        self.get_store_prices(&product_at_store)?
            .get_price(date)
            .ok_or(Error::DateTooEarly {
                product: product_at_store.product_key,
                store: product_at_store.store_name,
                date,
            })
    }

    /// Latest known price at every store carrying the product, cheapest first.
    pub fn latest_prices(&self, product_name: &str) -> Vec<StorePrice> {
        let key = product_key(product_name);

        let mut result: Vec<StorePrice> = self
            .prices
            .iter()
            .filter(|(product_at_store, _)| product_at_store.product_key == key)
            .filter_map(|(product_at_store, store_prices)| {
                store_prices.latest().map(|(date, price)| StorePrice {
                    store: product_at_store.store_name.clone(),
                    price,
                    date,
                })
            })
            .collect();

        result.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.store.cmp(&b.store)));
        result
    }

    pub fn cheapest_store(&self, product_name: &str) -> Result<StorePrice> {
        self.latest_prices(product_name)
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoSuchProduct(product_key(product_name)))
    }

    fn get_store_prices(&self, product_at_store: &ProductAtStore) -> Result<&StorePrices> {
        self.prices
            .get(product_at_store)
            .ok_or_else(|| Error::NoSuchProduct(product_at_store.product_key.clone()))
    }

    fn add_records(&mut self, records: &[PurchaseLineRecord], resolver: &DateResolver) {
        for record in records {
            self.add_price(
                &record.product_name,
                &record.store,
                record.price_value(),
                resolver.resolve(&record.date_text).date,
            );
        }
    }

    fn add_price(&mut self, product_name: &str, store_name: &str, price: Decimal, date: NaiveDate) {
        let product_at_store = ProductAtStore::new(product_name, store_name);
        self.prices
            .entry(product_at_store)
            .or_insert_with(StorePrices::new)
            .table
            .insert(date, price);
    }
}
