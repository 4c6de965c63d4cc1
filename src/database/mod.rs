pub mod connection;
pub mod verification_store;

pub use connection::*;
pub use verification_store::*;
