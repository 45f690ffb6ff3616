// Domain layer: catalog/order models and the ports the engine reads through.

pub mod model;
pub mod ports;
