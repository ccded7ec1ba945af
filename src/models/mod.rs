pub mod listing;
pub mod report;
pub mod symbol;

pub use listing::*;
pub use report::*;
pub use symbol::*;
