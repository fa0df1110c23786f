pub mod category;
pub mod parser;
pub mod temporal;
pub mod baseline;
pub mod anomaly;
pub mod summary;
pub mod config;
pub mod source;
pub mod sink;
pub mod pipeline;
pub mod error;

pub use anomaly::{detect, Anomaly};
pub use baseline::{estimate, BaselineStats};
pub use error::RadarError;
pub use summary::{build_summary, Summary};
pub use temporal::DailyCountTable;
