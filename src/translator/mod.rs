pub mod translate_error;
pub use translate_error::*;

pub mod config;
pub use config::*;

pub mod active_source;
pub use active_source::*;

pub mod translator;
pub use translator::*;

pub mod samples;
pub use samples::*;
