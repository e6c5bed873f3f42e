//! Statistics over a loaded [`Dataset`](crate::data::model::Dataset):
//! group means and frequency tables, the correlation matrix, and
//! descriptive summaries.

pub mod aggregate;
pub mod correlation;
pub mod describe;

pub use aggregate::{column_mean, frequency, group_means, FrequencyTable, GroupAggregate};
pub use correlation::{correlation_matrix, CorrelationMatrix};
pub use describe::{describe, Summary};
