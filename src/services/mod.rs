pub mod blog_service;
pub mod otp_service;
pub mod payment_service;
pub mod ticket_service;

pub use blog_service::*;
pub use otp_service::*;
pub use payment_service::*;
pub use ticket_service::*;
