pub mod model;
pub mod pipeline;

pub use model::{format_hex, load_hex, parse_hex, write_hex, write_listing};
pub use pipeline::{run_pipeline, PipelinePaths};
