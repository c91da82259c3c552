use clap::{Parser, Subcommand};
use clap_complete::Shell;
use clap_complete::engine::ArgValueCompleter;

use crate::complete::installed_versions;

const LONG_ABOUT: &str = "\
Mango is a command-line tool that simplifies the installation and management \
of multiple Go versions.

Versions are kept under ~/.mango/version (or $MANGO_DIR/version) and the \
active one is exposed through links in ~/.mango/bin. Invocations against the \
same directory are not locked against each other; run them one at a time.";

#[derive(Parser, Debug)]
#[command(name = "mango")]
#[command(version, about = "Go Version Manager", long_about = LONG_ABOUT)]
pub struct Cli {
    /// Mirror log output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Download Go versions
    #[command(alias = "download")]
    Install {
        /// A version such as 1.22.0, or "latest"
        version: String,

        /// Switch to the version once it is installed
        #[arg(long = "use")]
        activate: bool,
    },

    /// Remove Go versions
    #[command(alias = "remove")]
    Uninstall {
        /// An installed version
        #[arg(add = ArgValueCompleter::new(installed_versions))]
        version: String,
    },

    /// Select Go version
    #[command(alias = "set")]
    Use {
        /// An installed version, or "latest"
        #[arg(add = ArgValueCompleter::new(installed_versions))]
        version: String,
    },

    /// Show Go versions
    #[command(alias = "show")]
    List,

    /// Build information
    Version,

    /// Generate a static completion script. `COMPLETE=<shell> mango` emits
    /// one that also completes installed versions.
    #[command(hide = true)]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(args)
            .expect("arguments should parse")
            .command
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn aliases_map_to_their_commands() {
        assert_eq!(
            parse(&["mango", "download", "1.22.0"]),
            Commands::Install {
                version: "1.22.0".to_string(),
                activate: false
            }
        );
        assert_eq!(
            parse(&["mango", "remove", "1.21.0"]),
            Commands::Uninstall {
                version: "1.21.0".to_string()
            }
        );
        assert_eq!(
            parse(&["mango", "set", "latest"]),
            Commands::Use {
                version: "latest".to_string()
            }
        );
        assert_eq!(parse(&["mango", "show"]), Commands::List);
    }

    #[test]
    fn install_accepts_use_flag() {
        assert_eq!(
            parse(&["mango", "install", "latest", "--use"]),
            Commands::Install {
                version: "latest".to_string(),
                activate: true
            }
        );
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["mango", "list", "--verbose"]).expect("arguments parse");
        assert!(cli.verbose);
    }

    #[test]
    fn version_arguments_complete_installed_versions() {
        use clap_complete::engine::ArgValueCompleter;

        let command = Cli::command();
        for name in ["uninstall", "use"] {
            let subcommand = command
                .find_subcommand(name)
                .expect("subcommand exists");
            let version = subcommand
                .get_arguments()
                .find(|arg| arg.get_id() == "version")
                .expect("version argument exists");
            assert!(
                version.get::<ArgValueCompleter>().is_some(),
                "{name} should complete installed versions"
            );
        }
    }

    #[test]
    fn missing_or_extra_arguments_are_usage_errors() {
        assert!(Cli::try_parse_from(["mango", "install"]).is_err());
        assert!(Cli::try_parse_from(["mango", "use", "1.21", "1.22"]).is_err());
        assert!(Cli::try_parse_from(["mango", "list", "extra"]).is_err());
        assert!(Cli::try_parse_from(["mango", "completion", "tcsh"]).is_err());
    }
}
