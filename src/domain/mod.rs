// Domain layer: trip models and the capability traits for external providers.

pub mod model;
pub mod ports;
