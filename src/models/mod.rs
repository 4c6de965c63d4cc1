pub mod blog;
pub mod common;
pub mod otp;
pub mod payment;
pub mod ticket;

pub use blog::*;
pub use common::*;
pub use otp::*;
pub use payment::*;
pub use ticket::*;
