// Domain layer: request/response models and ports (interfaces) for the external collaborators.

pub mod model;
pub mod ports;
