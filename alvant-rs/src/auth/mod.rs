//! Admin authentication
//!
//! - [`otp`]: one-time code issuance and verification
//! - [`token`]: signed session tokens

pub mod otp;
pub mod token;

pub use otp::{OtpService, OtpSettings};
pub use token::{Claims, JwtConfig};
