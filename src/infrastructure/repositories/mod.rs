// Gateway implementations (data access layer)
// Adapters that implement the domain TeamGateway port

pub mod in_memory_team_gateway;
pub mod postgres_team_gateway;

pub use in_memory_team_gateway::{GatewayCall, InMemoryTeamGateway, ScriptedResponse};
pub use postgres_team_gateway::PostgresTeamGateway;
