mod format;
mod types;

pub use format::{format_period, format_price_eok, format_price_kor};
pub use types::{
    ChatMessage, MarketSnapshot, Quintile, RankingEntry, Role, TransactionRecord,
};
