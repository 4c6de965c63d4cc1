pub mod phone_verifications;

pub use phone_verifications as phone_verification_entity;
