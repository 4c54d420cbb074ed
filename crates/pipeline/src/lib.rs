//! The batch pipeline: turns ingested transactions into proven, published and settled pods.

mod assembler;
mod config;
mod driver;
mod errors;

#[cfg(test)]
mod test_utils;

pub use assembler::BatchAssembler;
pub use config::PipelineConfig;
pub use driver::PipelineDriver;
pub use errors::PipelineError;
