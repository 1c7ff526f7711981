// Repository/gateway ports
// Implemented by infrastructure adapters, consumed by the application layer

pub mod team_gateway;

pub use team_gateway::{GatewayError, TeamFilter, TeamGateway};
