use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Try one extraction and send a test message, then report both
    Test,
    /// Poll once and exit; non-zero status if no reading was obtained
    Once,
    /// Poll on a fixed interval until interrupted
    Run,
}

#[derive(Debug, Parser)]
#[clap(
    name = "liqwatch",
    version,
    about = "Watches satUSD-v1 liquidity and alerts over Telegram"
)]
pub struct Cli {
    /// Mode to run in (defaults to `once`)
    #[clap(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Once)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_once() {
        let cli = Cli::try_parse_from(["liqwatch"]).unwrap();
        assert_eq!(cli.command(), Command::Once);
    }

    #[test]
    fn subcommands_parse() {
        for (arg, expected) in [("test", Command::Test), ("once", Command::Once), ("run", Command::Run)] {
            let cli = Cli::try_parse_from(["liqwatch", arg]).unwrap();
            assert_eq!(cli.command(), expected);
        }
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["liqwatch", "watch"]).is_err());
    }
}
