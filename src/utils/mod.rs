pub mod constants;
pub mod errors;
pub mod loader;
pub mod logging;

pub use constants::RunCode;
pub use errors::{BuildError, ConstructionError, LoadError, SchemaError};
pub use loader::read_instance_dir;
