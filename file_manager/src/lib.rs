pub mod aws_config;
pub mod credential_cache;
pub mod serde_support;
