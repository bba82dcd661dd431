pub mod models;
pub mod store;

mod seed;
