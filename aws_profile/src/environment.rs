use session::identity::ResolvedIdentity;
use shared::invocation::{Invocation, ProfilePolicy, DEFAULT_PROFILE_ENV, PROFILE_ENV};
use std::process::Command;

pub const ACCESS_KEY_ID_ENV: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN_ENV: &str = "AWS_SESSION_TOKEN";
pub const SECURITY_TOKEN_ENV: &str = "AWS_SECURITY_TOKEN";
pub const DEFAULT_REGION_ENV: &str = "AWS_DEFAULT_REGION";
pub const REGION_ENV: &str = "AWS_REGION";
pub const TOKEN_TYPE_ENV: &str = "AWS_TOKEN_TYPE";

/// Changes applied to the child's inherited environment, removals first
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChildEnvironment {
    pub removed: Vec<&'static str>,
    pub set: Vec<(&'static str, String)>,
}

impl ChildEnvironment {
    pub fn build(
        invocation: &Invocation,
        identity: &ResolvedIdentity,
        token_type: Option<&str>,
    ) -> Self {
        let mut removed = vec![ACCESS_KEY_ID_ENV, SECRET_ACCESS_KEY_ENV, SESSION_TOKEN_ENV];
        if invocation.policy == ProfilePolicy::Positional {
            removed.push(DEFAULT_PROFILE_ENV);
            removed.push(PROFILE_ENV);
        }

        let mut set = Vec::new();

        if let Some(profile) = &invocation.profile {
            set.push((PROFILE_ENV, profile.clone()));
        }

        if let Some(region) = &identity.region {
            set.push((DEFAULT_REGION_ENV, region.clone()));
            set.push((REGION_ENV, region.clone()));
        }

        set.push((ACCESS_KEY_ID_ENV, identity.access_key.clone()));
        set.push((SECRET_ACCESS_KEY_ENV, identity.secret_key.clone()));

        if let Some(token) = &identity.session_token {
            let name = if token_type == Some("security") {
                SECURITY_TOKEN_ENV
            } else {
                SESSION_TOKEN_ENV
            };
            set.push((name, token.clone()));
        }

        Self { removed, set }
    }

    pub fn apply(&self, command: &mut Command) {
        for name in &self.removed {
            command.env_remove(name);
        }
        for (name, value) in &self.set {
            command.env(name, value);
        }
    }

    /// Variable names only, safe to log
    pub fn names(&self) -> Vec<&'static str> {
        self.set.iter().map(|(name, _)| *name).collect()
    }
}
