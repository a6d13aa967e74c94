// Domain layer: directory records, classification rules and the ports the pipelines are built on.

pub mod model;
pub mod ports;
