//! Core traits defining the tripkit client seams.

mod marketplace;

pub use marketplace::Marketplace;
