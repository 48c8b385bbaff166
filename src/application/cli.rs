use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use super::repl::help_text;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::services::Snapshots;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

async fn print_state() -> Result<()> {
    let snapshots = Snapshots::default();
    match snapshots.load().await? {
        Some(state) => {
            print!("{}", serde_yaml::to_string(&state)?);
        }
        None => {
            println!("There is no saved assistant state yet.");
        }
    }

    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_state() -> Command {
    return Command::new("state")
        .about("Inspect the assistant state kept between runs.")
        .arg_required_else_help(true)
        .subcommand(Command::new("path").about("Print the path of the state file."))
        .subcommand(Command::new("show").about("Print the saved state."))
        .subcommand(
            Command::new("clear").about("Delete the saved state. The next run starts a new chat."),
        );
}

fn subcommand_chat() -> Command {
    return Command::new("chat").about("Chat with the agent, continuing the saved session.");
}

fn subcommand_open() -> Command {
    return Command::new("open")
        .about("Open a conversation stored by the agent.")
        .arg(
            clap::Arg::new(ConfigKey::ConversationID.to_string())
                .short('i')
                .long("id")
                .help("Conversation ID")
                .num_args(1)
                .required(true),
        );
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("deckhand")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_open())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .subcommand(subcommand_state())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("DECKHAND_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::AgentKind.to_string())
                .short('a')
                .long(ConfigKey::AgentKind.to_string())
                .env("DECKHAND_AGENT_KIND")
                .num_args(1)
                .help(format!("Which agent answers new conversations. [default: {}]", Config::default(ConfigKey::AgentKind)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::AgentURL.to_string())
                .long(ConfigKey::AgentURL.to_string())
                .env("DECKHAND_AGENT_URL")
                .num_args(1)
                .help(format!("Base URL of the dashboard's agent API. [default: {}]", Config::default(ConfigKey::AgentURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::AgentToken.to_string())
                .long(ConfigKey::AgentToken.to_string())
                .env("DECKHAND_AGENT_TOKEN")
                .num_args(1)
                .help("Bearer token sent with every request to the agent API.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::RequestTimeout.to_string())
                .long(ConfigKey::RequestTimeout.to_string())
                .env("DECKHAND_REQUEST_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds for the agent to answer a request. [default: {}]", Config::default(ConfigKey::RequestTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::StateDir.to_string())
                .long(ConfigKey::StateDir.to_string())
                .env("DECKHAND_STATE_DIR")
                .num_args(1)
                .help("Directory holding the saved assistant state. Defaults to the user cache directory.")
                .global(true),
        );
}

/// Returns true when the chat should start.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("open", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(false);
        }
        Some(("state", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            match subcmd_matches.subcommand() {
                Some(("path", _)) => {
                    println!("{}", Snapshots::default().path().to_string_lossy());
                }
                Some(("show", _)) => {
                    print_state().await?;
                }
                Some(("clear", _)) => {
                    Snapshots::default().clear().await?;
                    println!("Cleared saved assistant state");
                }
                _ => {
                    subcommand_state().print_long_help()?;
                }
            }
            return Ok(false);
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
