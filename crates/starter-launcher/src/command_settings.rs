// CommandSettings: the `sim-starter` command line.

use clap::{Parser, Subcommand};
use starter_common::constants;
use std::path::PathBuf;

/// Launch sim profiles and keep Sim Starter up to date.
#[derive(Debug, Clone, Parser)]
#[command(name = "sim-starter", version, about)]
pub struct CommandSettings {
    /// Profile catalog to use instead of `profiles.json` beside the executable.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run the profile with this id and exit (shortcut entry point).
    #[arg(long = "run-profile-id", value_name = "ID")]
    pub run_profile_id: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List configured profiles.
    List,

    /// Run a profile by 1-based index, id or name.
    ///
    /// Keys are tried in that order: a number in range always picks by
    /// position, even if another profile is named after it.
    Run {
        #[arg(value_name = "PROFILE")]
        profile: String,
    },

    /// Check for a newer release and install it.
    Update {
        #[arg(long, default_value = constants::update::DEFAULT_OWNER)]
        owner: String,

        #[arg(long, default_value = constants::update::DEFAULT_REPO)]
        repo: String,
    },

    /// Print the running version.
    Version,
}

impl CommandSettings {
    /// The command to execute. An explicit subcommand wins; otherwise
    /// `--run-profile-id` means `run` and nothing at all means `list`.
    pub fn resolved_command(&self) -> Command {
        match (&self.command, &self.run_profile_id) {
            (Some(command), _) => command.clone(),
            (None, Some(id)) => Command::Run {
                profile: id.clone(),
            },
            (None, None) => Command::List,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CommandSettings {
        CommandSettings::try_parse_from(std::iter::once("sim-starter").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn run_takes_a_profile_key() {
        let settings = parse(&["run", "Race night"]);
        assert_eq!(
            settings.resolved_command(),
            Command::Run {
                profile: "Race night".into()
            }
        );
    }

    #[test]
    fn run_profile_id_is_a_shortcut_for_run() {
        let settings = parse(&["--run-profile-id", "abc-123"]);
        assert_eq!(
            settings.resolved_command(),
            Command::Run {
                profile: "abc-123".into()
            }
        );
    }

    #[test]
    fn update_defaults_owner_and_repo() {
        let settings = parse(&["update"]);
        assert_eq!(
            settings.resolved_command(),
            Command::Update {
                owner: constants::update::DEFAULT_OWNER.into(),
                repo: constants::update::DEFAULT_REPO.into(),
            }
        );
        let settings = parse(&["update", "--owner", "me", "--repo", "fork"]);
        assert_eq!(
            settings.resolved_command(),
            Command::Update {
                owner: "me".into(),
                repo: "fork".into(),
            }
        );
    }

    #[test]
    fn config_is_global_and_default_is_list() {
        let settings = parse(&["list", "--config", "/tmp/p.json"]);
        assert_eq!(settings.config, Some(PathBuf::from("/tmp/p.json")));
        assert_eq!(parse(&[]).resolved_command(), Command::List);
    }

    #[test]
    fn run_help_documents_lookup_order() {
        use clap::CommandFactory;

        let mut cli = CommandSettings::command();
        let run = cli.find_subcommand_mut("run").unwrap();
        let help = run.render_long_help().to_string();
        let help = help.split_whitespace().collect::<Vec<_>>().join(" ");
        assert!(help.contains("Run a profile by 1-based index, id or name."));
        assert!(help.contains("a number in range always picks by position"));
    }

    #[test]
    fn subcommand_wins_over_run_profile_id() {
        let settings = parse(&["--run-profile-id", "x", "version"]);
        assert_eq!(settings.resolved_command(), Command::Version);
    }
}
