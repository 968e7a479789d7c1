pub mod analysis;
pub mod extraction;
pub mod trends;
