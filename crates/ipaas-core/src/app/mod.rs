//! App - the application layer, built from the ports.
//!
//! # Components
//! - **IndexerConfig**: settings (env / CLI)
//! - **ConnectionRepository**: connector catalog + one index cycle
//! - **IndexScheduler**: background loop with fixed delay and cancellation
//! - **connector_details**: component schema lookup
//! - **plan_option_pages**: endpoint options split into wizard pages

pub mod config;
pub mod details;
pub mod options;
pub mod repository;
pub mod scheduler;

pub use self::config::{IndexerConfig, SeenPolicy};
pub use self::details::{DetailsError, connector_details, resolve_schema};
pub use self::options::{
    EndpointOption, MAX_OPTIONS, OptionPage, OptionsError, plan_connector_pages, plan_option_pages,
};
pub use self::repository::{ConnectionRepository, CycleReport};
pub use self::scheduler::{IndexScheduler, SchedulerState};
