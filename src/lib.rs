pub mod amount;
pub mod comparison;
pub mod consolidate;
pub mod date;
pub mod error;
pub mod options;
pub mod purchases;
pub mod record;
pub mod statistics;

pub use comparison::{PriceComparison, StorePrice};
pub use consolidate::{consolidate, ConsolidatedProduct, PriceObservation, PriceTrend};
pub use date::{DateResolver, DateSource, ResolvedDate};
pub use error::{Error, Result};
pub use options::ConsolidationOptions;
pub use purchases::{flatten_purchases, load_purchases_json, load_records_json, Purchase, PurchaseItem};
pub use record::PurchaseLineRecord;
pub use statistics::{MonthlySpending, Spending, SpendingReport};
