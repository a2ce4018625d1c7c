//! # palyno-lab: Boundary Layer
//!
//! Everything around the pure core that touches the outside world:
//! configuration files, JSON exports from storage, and the in-memory
//! registry of counting sessions in progress.
//!
//! ## Modules
//!
//! - [`config`] - `LabConfig` loaded from defaults, TOML and environment
//! - [`records`] - JSON loaders and the pool to beekeeper join
//! - [`registry`] - One counting session per pool, shared across threads
//! - [`error`] - Lab error types

pub mod config;
pub mod error;
pub mod records;
pub mod registry;

pub use config::{LabConfig, ReportSettings};
pub use error::{LabError, LabResult};
pub use records::{load_counts, load_memberships, load_records, pools_for_beekeeper, PoolMembership};
pub use registry::SessionRegistry;
