pub mod claims;
pub mod gate;
pub mod jwt;

pub use claims::Claims;
pub use gate::{authorize, AccessDenied};
pub use jwt::{mint_token, validate_token, TokenRejected};
