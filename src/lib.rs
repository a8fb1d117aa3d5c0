pub mod data;
pub mod retail;
