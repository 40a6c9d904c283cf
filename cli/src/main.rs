mod commands;
mod terminal;

use commands::{CommandLine, Commands, check, list};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose);

    let cfg = commands.to_config()?;

    match commands.command {
        Commands::Check(_) => {
            print::header("checking ssh hosts", cfg.quiet);
            check::check(&cfg).await
        }
        Commands::List => {
            print::header("configured hosts", cfg.quiet);
            list::list(&cfg)
        }
    }
}
