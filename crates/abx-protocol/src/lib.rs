//! abx protocol - experiment data model and wire formats
//!
//! Types exchanged with the experiment backend: experiments, their traffic
//! variants, paged listings and results, plus the ndjson codec used by the
//! bulk export/import endpoints.

pub mod constants;
pub mod error;
pub mod ndjson;
pub mod types;

pub use constants::*;
pub use error::*;
pub use types::*;
