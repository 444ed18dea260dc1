mod gateway;
mod session;

pub use gateway::RemoteContentGateway;
pub use session::SessionTokenManager;
