pub mod api;
pub mod ascii;
pub mod config;
pub mod errors;
pub mod json;
pub mod logger;
pub mod materialize;
pub mod source;
pub mod tree;

pub use api::{parse, plant, Outcome, Request, Runner, SeedError};
pub use config::{Format, ParseOptions};
pub use tree::{Counts, TreeNode};
