use crate::args::Args;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

pub const CACHE_ENV: &str = "AWS_CACHE";
pub const DEFAULT_PROFILE_ENV: &str = "AWS_DEFAULT_PROFILE";
pub const PROFILE_ENV: &str = "AWS_PROFILE";

/// Where the profile name may come from.
///
/// Both policies honour an explicit `--profile`. They disagree on the environment:
/// `Flag` never reads it and lets the SDK pick its default profile, while `Positional`
/// checks `AWS_DEFAULT_PROFILE` before `AWS_PROFILE` and finally accepts the first
/// argument before the command as the profile name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfilePolicy {
    Flag,
    Positional,
}

/// Everything needed to run one wrapped command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub command: Vec<String>,
    pub cache_enabled: bool,
    pub policy: ProfilePolicy,
}

/// Returned instead of an invocation when there is nothing to run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Usage(pub String);

impl Display for Usage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Invocation {
    pub fn resolve(
        args: Args,
        program_name: &str,
        env: &HashMap<String, String>,
    ) -> Result<Invocation, Usage> {
        let cache_enabled = cache_enabled(env);

        if !args.positional_profile {
            if args.command.is_empty() {
                return Err(Usage(Args::usage()));
            }

            return Ok(Invocation {
                profile: args.profile,
                region: args.region,
                command: args.command,
                cache_enabled,
                policy: ProfilePolicy::Flag,
            });
        }

        let mut command = args.command;
        let profile = args
            .profile
            .or_else(|| non_empty(env, DEFAULT_PROFILE_ENV))
            .or_else(|| non_empty(env, PROFILE_ENV))
            .or_else(|| {
                if command.len() >= 2 {
                    Some(command.remove(0))
                } else {
                    None
                }
            });

        if profile.is_none() || command.is_empty() {
            return Err(Usage(format!(
                "Usage: {} [profile] command [args]\n",
                program_name
            )));
        }

        Ok(Invocation {
            profile,
            region: args.region,
            command,
            cache_enabled,
            policy: ProfilePolicy::Positional,
        })
    }
}

/// Caching is on unless `AWS_CACHE` is `false` in any casing
pub fn cache_enabled(env: &HashMap<String, String>) -> bool {
    env.get(CACHE_ENV)
        .map(|value| !value.eq_ignore_ascii_case("false"))
        .unwrap_or(true)
}

fn non_empty(env: &HashMap<String, String>, name: &str) -> Option<String> {
    env.get(name).filter(|value| !value.is_empty()).cloned()
}
