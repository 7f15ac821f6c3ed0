//! histotrail crate root: re-exports and module wiring.
//!
//! This crate implements the history trail engine for telemetry log
//! archives: it aggregates per-session "vault" statistics into trail records,
//! computes robust statistics for display (Tukey box plots, quantile based
//! outlier elimination, quadratic trends) and synchronizes scales across
//! linked channels.
//!
//! The cohesive modules:
//! - `vault`: the read-only input records and their chronological map
//! - `device`: the channel item configuration consumed by the engine
//! - `trail`: taxonomy, selection, records, record set, synchronization
//! - `stats`: quantiles, regression and time-range sections
//! - `gps`: coordinate clustering and the background location tagging
//! - `mapper`/`format`/`summary`: display-ready tables, values and layouts

pub mod config;
pub mod device;
pub mod error;
pub mod format;
pub mod gps;
pub mod mapper;
pub mod stats;
pub mod summary;
pub mod template;
pub mod trail;
pub mod vault;

// Public re-exports for a compact external API
pub use config::HistoDisplaySettings;
pub use device::{ChannelConfig, ChannelItem, DataType, MeasurementConfig, ScoreConfig,
    ScoreGroupConfig, SettlementConfig, StatisticsConfig, TrailDisplayConfig};
pub use error::HistoError;
pub use stats::section::RecordSection;
pub use template::HistoTemplate;
pub use trail::record::TrailRecord;
pub use trail::record_set::TrailRecordSet;
pub use trail::types::TrailType;
pub use vault::{Vault, VaultMap};
