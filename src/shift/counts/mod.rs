pub mod batch;
pub mod changelog;
pub mod config;
pub mod delta;
pub mod eos;
pub mod error;
pub mod import;
pub mod io;
pub mod model;
pub mod sync;
pub mod table;
pub mod trend;
pub mod workbook;

pub use error::{CountsError, Result};
