use std::path::PathBuf;

use clap::{Parser, Subcommand};
use snipe_yourself::{
    api::InvalidUserQuery,
    commands::{self, ProfileArgs},
    config::ConfigStore,
    render::OutputPathError,
    schema::GameMode,
    setting::SettingError,
};

#[derive(Parser)]
#[clap(version, about = "Finds the plays in your osu! top 100 that you choked the hardest")]
struct Opts {
    /// Where the config is stored.  Defaults to the user's config directory.
    #[arg(long, global = true)]
    config_path: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebases the top plays of a user.
    #[clap(alias = "calculate")]
    Profile {
        /// User ID or username.  Defaults to the configured profile.
        query: Option<String>,
        #[arg(value_enum, default_value_t)]
        mode: GameMode,
        /// Print the report as tables.  Implied when `--json` is absent.
        #[arg(short, long)]
        console: bool,
        /// Directory to write one `<RANK>.json` file per rank into.
        #[arg(short, long)]
        json: Option<PathBuf>,
        /// Maximum number of beatmaps looked up at once.
        #[arg(long, default_value_t = 10)]
        concurrency: usize,
    },
    #[clap(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Shows every setting.
    List,
    /// Sets a setting.  The name is autocorrected.
    Set { setting: String, value: String },
    /// Resets one setting, or all of them.
    Reset { setting: Option<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let opts = Opts::parse();

    let path = match opts.config_path {
        Some(path) => path,
        None => ConfigStore::default_path()?,
    };
    let mut store = ConfigStore::load(path)?;

    let res = match opts.command {
        Command::Profile {
            query,
            mode,
            console,
            json,
            concurrency,
        } => {
            let args = ProfileArgs {
                query,
                mode,
                console,
                json,
                concurrency,
            };
            commands::profile(&mut store, args).await
        }
        Command::Config(ConfigCommand::List) => {
            commands::config_list(&store);
            Ok(())
        }
        Command::Config(ConfigCommand::Set { setting, value }) => {
            commands::config_set(&mut store, &setting, &value)
        }
        Command::Config(ConfigCommand::Reset { setting }) => {
            commands::config_reset(&mut store, setting.as_deref())
        }
    };
    match res {
        Err(e)
            if e.is::<SettingError>()
                || e.is::<OutputPathError>()
                || e.is::<InvalidUserQuery>() =>
        {
            eprintln!("[ERROR] {e}");
            Ok(())
        }
        res => res,
    }
}
