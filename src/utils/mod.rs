pub mod code_generator;
pub mod jwt;
pub mod phone;
pub mod upload;

pub use code_generator::generate_otp_code;
pub use jwt::*;
pub use phone::*;
pub use upload::*;
