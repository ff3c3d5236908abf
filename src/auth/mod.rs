pub mod context;
pub mod rbac;
pub mod session;

pub use context::UserContext;
pub use session::UserSession;
