pub mod identity;
pub mod role;
pub mod session;
