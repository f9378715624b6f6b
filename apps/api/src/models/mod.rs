pub mod remedy;
pub mod tracking;
