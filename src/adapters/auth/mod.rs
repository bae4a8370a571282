//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` and `AccountReader` ports:
//!
//! - `jwt` - HS256 bearer token validation
//! - `mock` - Test implementations that don't require external services

mod jwt;
mod mock;

pub use jwt::{JwtConfig, JwtSessionValidator};
pub use mock::{MockAccountReader, MockSessionValidator};
