// Application layer: use cases on top of the local store and the pure
// aggregation in `domain`.

pub mod error;
mod reporting;
mod service;
mod snapshot;

pub use error::*;
pub use reporting::*;
pub use service::*;
pub use snapshot::*;
