//! Deployment stages
//!
//! Deployers are attached to a named stage and each stage keeps its own
//! ordering. Stage names are plain strings; the constants below are the
//! standard lifecycle, in processing order.

pub mod registry;

pub use registry::{StageOrders, StagedRegistry};

pub const PARSE: &str = "parse";
pub const DESCRIBE: &str = "describe";
pub const CLASSLOADER: &str = "classloader";
pub const REAL: &str = "real";
pub const INSTALLED: &str = "installed";

/// Stage a deployer lands in when it does not name one
pub const DEFAULT_STAGE: &str = REAL;

pub const STANDARD_STAGES: [&str; 5] = [PARSE, DESCRIBE, CLASSLOADER, REAL, INSTALLED];

pub fn standard_stages() -> Vec<String> {
    STANDARD_STAGES.iter().map(|s| s.to_string()).collect()
}
