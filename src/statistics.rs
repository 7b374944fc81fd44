use crate::amount::accumulate;
use crate::options::ConsolidationOptions;
use crate::record::PurchaseLineRecord;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::AddAssign;
use tracing::{debug, warn};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Spending over a set of purchase lines.
///
/// Maps store and category names to the money spent there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spending {
    pub total: Decimal,
    pub lines: usize,
    pub by_store: HashMap<String, Decimal>,
    pub by_category: HashMap<String, Decimal>,
}

impl Spending {
    pub fn new() -> Spending {
        Spending::default()
    }

    /// A line whose amount would overflow any of the totals counts as zero.
    pub fn update_with_record(&mut self, record: &PurchaseLineRecord) {
        let store = record.store.trim().to_string();
        let category = category_name(&record.category);
        let mut amount = record.line_total();

        let fits = move |current: Option<&Decimal>| {
            current
                .copied()
                .unwrap_or(Decimal::ZERO)
                .checked_add(amount)
                .is_some()
        };
        if !(fits(Some(&self.total))
            && fits(self.by_store.get(&store))
            && fits(self.by_category.get(&category)))
        {
            warn!(
                "Spending on {:?} overflows the totals, counting it as 0",
                record.product_name
            );
            amount = Decimal::ZERO;
        }

        self.total += amount;
        self.lines += 1;
        *self.by_store.entry(store).or_insert(Decimal::ZERO) += amount;
        *self.by_category.entry(category).or_insert(Decimal::ZERO) += amount;
    }

    pub fn store_total(&self, store_name: &str) -> Decimal {
        self.by_store
            .get(store_name)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn category_total(&self, category: &str) -> Decimal {
        self.by_category
            .get(&category_name(category))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

impl<'a> From<&'a [PurchaseLineRecord]> for Spending {
    fn from(records: &'a [PurchaseLineRecord]) -> Self {
        let mut spending = Spending::new();
        for record in records {
            spending.update_with_record(record);
        }
        spending
    }
}

impl<'a> AddAssign<&'a Spending> for Spending {
    fn add_assign(&mut self, other: &'a Spending) {
        accumulate(&mut self.total, other.total);
        self.lines += other.lines;
        for (store, amount) in &other.by_store {
            accumulate(
                self.by_store.entry(store.clone()).or_insert(Decimal::ZERO),
                *amount,
            );
        }
        for (category, amount) in &other.by_category {
            accumulate(
                self.by_category
                    .entry(category.clone())
                    .or_insert(Decimal::ZERO),
                *amount,
            );
        }
    }
}

fn category_name(category: &str) -> String {
    let category = category.trim();
    if category.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        category.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySpending {
    pub year: i32,
    pub month: u32,
    pub spending: Spending,
    /// Spending from the first month up to and including this one.
    pub running_total: Decimal,
}

impl MonthlySpending {
    pub fn new(year: i32, month: u32) -> MonthlySpending {
        MonthlySpending {
            year,
            month,
            spending: Spending::new(),
            running_total: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingReport {
    pub monthly: Vec<MonthlySpending>,
    pub total: Spending,
}

impl SpendingReport {
    /// Months without purchases are left out.
    pub fn new(records: &[PurchaseLineRecord], options: &ConsolidationOptions) -> SpendingReport {
        let resolver = options.resolver();

        let mut dated: Vec<(NaiveDate, &PurchaseLineRecord)> = records
            .iter()
            .map(|record| (resolver.resolve(&record.date_text).date, record))
            .collect();
        dated.sort_by_key(|(date, _)| *date);

        let mut report = SpendingReport::default();
        let mut current: Option<MonthlySpending> = None;

        for (date, record) in dated {
            let starts_new_month = match &current {
                Some(m) => m.year != date.year() || m.month != date.month(),
                None => true,
            };

            if starts_new_month {
                if let Some(mut finished) = current.take() {
                    finished.running_total = report.total.total;
                    report.monthly.push(finished);
                }
                current = Some(MonthlySpending::new(date.year(), date.month()));
            }

            if let Some(month) = current.as_mut() {
                month.spending.update_with_record(record);
            }
            report.total.update_with_record(record);
        }

        if let Some(mut finished) = current.take() {
            finished.running_total = report.total.total;
            report.monthly.push(finished);
        }

        debug!(
            "Spending report over {} records, {} months",
            records.len(),
            report.monthly.len()
        );

        report
    }

    pub fn month(&self, year: i32, month: u32) -> Option<&MonthlySpending> {
        self.monthly
            .iter()
            .find(|m| m.year == year && m.month == month)
    }
}
