mod account;
mod aggregate;
pub mod category;
mod ledger;
mod money;
mod period;
mod transaction;

pub use account::*;
pub use aggregate::*;
pub use ledger::*;
pub use money::*;
pub use period::*;
pub use transaction::*;
