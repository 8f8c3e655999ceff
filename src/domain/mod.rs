// Domain layer: cast records, import responses and the ports the pipelines depend on.

pub mod model;
pub mod ports;
