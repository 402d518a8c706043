mod export;
mod import;
mod legacy;

pub use export::*;
pub use import::*;
pub use legacy::*;
