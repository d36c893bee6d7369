//! Query modules for each table.

pub mod frequencies;
pub mod leads;
pub mod stages;
pub mod tags;
pub mod teams;
pub mod util;
