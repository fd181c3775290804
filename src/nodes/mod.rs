pub mod bridge;
pub mod customer;
pub mod supervisor;

pub use bridge::BridgeGate;
pub use customer::CustomerNode;
pub use supervisor::SupervisorNode;
