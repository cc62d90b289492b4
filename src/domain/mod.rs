// Domain layer: repository entities and the service ports the builders drive.

pub mod model;
pub mod ports;
