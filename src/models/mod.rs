pub mod analysis;
pub mod enums;
pub mod note;
pub mod patient;
pub mod report;

pub use analysis::*;
pub use note::*;
pub use patient::*;
pub use report::*;
