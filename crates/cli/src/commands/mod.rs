pub mod generate;
pub mod models;
pub mod refresh;
pub mod transform;
