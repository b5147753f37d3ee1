//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod init;
mod inspect;
mod search;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use init::run_init;
pub use inspect::run_inspect;
pub use search::run_search;
