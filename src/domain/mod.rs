pub mod analysis;
pub mod records;

pub use analysis::*;
pub use records::*;
