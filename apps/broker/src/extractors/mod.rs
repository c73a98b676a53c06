pub mod authenticated;
pub mod request_context;

pub use authenticated::Authenticated;
pub use request_context::RequestContext;
