pub mod pipelines;
pub mod views;
