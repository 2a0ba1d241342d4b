//! Session recorder: the result record, its CSV store and the chart series

pub mod record;
pub mod series;
pub mod store;

pub use record::ResultRecord;
pub use series::ScoreSeries;
pub use store::ResultStore;
