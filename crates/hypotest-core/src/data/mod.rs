//! Flat tables and categorical factors

mod factor;
mod table;

pub use factor::Factor;
pub use table::{Column, Table};
