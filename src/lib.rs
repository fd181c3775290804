pub mod agent;
pub mod backend;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod decision;
pub mod enforcer;
pub mod error;
pub mod model;
pub mod nodes;
pub mod runtime;
pub mod scope;
pub mod state;
pub mod tools;
pub mod worker;

pub use error::{BridgeError, Result};
pub use runtime::Runtime;
