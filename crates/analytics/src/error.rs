use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("no transaction records available")]
    EmptyDataset,

    #[error("no transaction records for period {0}")]
    EmptyPeriod(u32),
}
