const HELP_TEMPLATE: &str = "usage: {usage}\n\n{about-with-newline}\n{all-args}{after-help}";

#[derive(clap::Parser, Debug)]
#[command(
    name = "aws-profile",
    author,
    version,
    about,
    long_about = None,
    help_template = HELP_TEMPLATE
)]
pub struct Args {
    /// The name of the profile whose credentials are exported
    #[arg(short, long)]
    pub profile: Option<String>,

    /// The region to export, overrides the region configured for the profile
    #[arg(short, long)]
    pub region: Option<String>,

    /// Take the profile from AWS_DEFAULT_PROFILE, AWS_PROFILE or the argument before the command
    #[arg(long, default_value_t = false)]
    pub positional_profile: bool,

    /// Enables verbose logging to stderr
    #[arg(short, long, default_value_t = false)]
    pub debug: bool,

    /// The command to run, followed by its arguments
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

impl Args {
    /// The help text printed when no command is given
    pub fn usage() -> String {
        use clap::CommandFactory;

        Self::command().render_help().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn flags_stop_at_the_command() {
        let args = Args::try_parse_from([
            "aws-profile",
            "-p",
            "dev",
            "--region",
            "eu-west-1",
            "aws",
            "s3",
            "ls",
            "--profile",
            "other",
        ])
        .unwrap();

        assert_eq!(args.profile.as_deref(), Some("dev"));
        assert_eq!(args.region.as_deref(), Some("eu-west-1"));
        assert_eq!(args.command, ["aws", "s3", "ls", "--profile", "other"]);
    }

    #[test]
    fn command_is_optional_at_parse_time() {
        let args = Args::try_parse_from(["aws-profile", "--profile", "dev"]).unwrap();
        assert!(args.command.is_empty());
    }

    #[test]
    fn usage_starts_with_lowercase_heading() {
        let usage = Args::usage();
        assert!(usage.starts_with("usage: aws-profile"), "{}", usage);
    }
}
