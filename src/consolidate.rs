use crate::amount::{accumulate, coerce_amount};
use crate::date::{DateResolver, DateSource};
use crate::options::ConsolidationOptions;
use crate::record::PurchaseLineRecord;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// One price seen for a product at a store on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceObservation {
    pub price: String,
    pub date_text: String,
    pub store: String,
    pub date: NaiveDate,
    pub date_source: DateSource,
}

impl PriceObservation {
    pub fn from_record(record: &PurchaseLineRecord, resolver: &DateResolver) -> PriceObservation {
        let resolved = resolver.resolve(&record.date_text);
        PriceObservation {
            price: record.price.clone(),
            date_text: record.date_text.clone(),
            store: record.store.clone(),
            date: resolved.date,
            date_source: resolved.source,
        }
    }

    pub fn price_value(&self) -> Decimal {
        coerce_amount(&self.price)
    }
}

/// Cross-purchase view of a single product.
///
/// `display_name` and `category` come from the first record seen for the
/// product; later records never override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedProduct {
    pub key: String,
    pub display_name: String,
    pub last_price: String,
    pub category: String,
    /// Most recent first.
    pub price_history: Vec<PriceObservation>,
}

/// Aggregated figures over one product's price history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTrend {
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub avg_price: Decimal,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub data_points: usize,
}

impl ConsolidatedProduct {
    fn new(key: String, record: &PurchaseLineRecord, observation: PriceObservation) -> Self {
        ConsolidatedProduct {
            key,
            display_name: record.product_name.clone(),
            last_price: observation.price.clone(),
            category: record.category.clone(),
            price_history: vec![observation],
        }
    }

    /// Appends and re-sorts. The sort is stable, so observations with equal
    /// dates keep their input order and the earliest of them stays on top.
    pub fn add_observation(&mut self, observation: PriceObservation) {
        self.price_history.push(observation);
        self.price_history.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(head) = self.price_history.first() {
            self.last_price = head.price.clone();
        }
    }

    pub fn last_price_value(&self) -> Decimal {
        coerce_amount(&self.last_price)
    }

    pub fn latest(&self) -> Option<&PriceObservation> {
        self.price_history.first()
    }

    /// Whether any observation had its date substituted with "today".
    pub fn has_assumed_dates(&self) -> bool {
        self.price_history
            .iter()
            .any(|o| o.date_source == DateSource::AssumedToday)
    }

    /// A price that would overflow the running sum counts as zero towards
    /// `avg_price`.
    pub fn trend(&self) -> Option<PriceTrend> {
        let first = self.price_history.last()?;
        let last = self.price_history.first()?;

        let prices: Vec<Decimal> = self
            .price_history
            .iter()
            .map(PriceObservation::price_value)
            .collect();
        let mut sum = Decimal::ZERO;
        for price in &prices {
            accumulate(&mut sum, *price);
        }

        Some(PriceTrend {
            min_price: prices.iter().copied().min()?,
            max_price: prices.iter().copied().max()?,
            avg_price: sum / Decimal::from(prices.len()),
            first_date: first.date,
            last_date: last.date,
            data_points: prices.len(),
        })
    }
}

/// Groups purchase-line records into one [`ConsolidatedProduct`] per distinct
/// product key, in order of first appearance.
///
/// Never fails: unrecognized dates sort as the resolver's "today" (flagged
/// with [`DateSource::AssumedToday`]) and prices are passed through as text.
pub fn consolidate(
    records: &[PurchaseLineRecord],
    options: &ConsolidationOptions,
) -> Vec<ConsolidatedProduct> {
    consolidate_with(records, &options.resolver())
}

pub fn consolidate_with(
    records: &[PurchaseLineRecord],
    resolver: &DateResolver,
) -> Vec<ConsolidatedProduct> {
    let mut products: Vec<ConsolidatedProduct> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = record.key();
        let observation = PriceObservation::from_record(record, resolver);

        match positions.get(&key) {
            Some(&position) => products[position].add_observation(observation),
            None => {
                positions.insert(key.clone(), products.len());
                products.push(ConsolidatedProduct::new(key, record, observation));
            }
        }
    }

    debug!(
        "Consolidated {} records into {} products",
        records.len(),
        products.len()
    );

    products
}
