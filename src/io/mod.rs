//! Input/output helpers.
//!
//! - CSV/JSON measurement ingest (`ingest`)
//! - projected lines export to CSV (`export`)
//! - fit JSON read/write (`fit_file`)

pub mod export;
pub mod fit_file;
pub mod ingest;

pub use export::*;
pub use fit_file::*;
pub use ingest::*;
