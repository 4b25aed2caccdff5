pub mod args;
pub mod invocation;
