#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::assigning_clones,
    clippy::bool_to_int_with_if,
    clippy::case_sensitive_file_extension_comparisons,
    clippy::cast_possible_wrap,
    clippy::doc_markdown,
    clippy::field_reassign_with_default,
    clippy::float_cmp,
    clippy::implicit_clone,
    clippy::items_after_statements,
    clippy::map_unwrap_or,
    clippy::manual_let_else,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    clippy::needless_raw_string_hashes,
    clippy::redundant_closure_for_method_calls,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::struct_field_names,
    clippy::too_many_lines,
    clippy::uninlined_format_args,
    clippy::unused_self,
    clippy::cast_precision_loss,
    clippy::unnecessary_cast,
    clippy::unnecessary_lazy_evaluations,
    clippy::unnecessary_literal_bound,
    clippy::unnecessary_map_or,
    clippy::unnecessary_wraps,
    dead_code
)]

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use greenthumb::agent::Agent;
use greenthumb::knowledge::GardeningManual;
use greenthumb::memory::GardenMemory;
use greenthumb::tools::seasonal_context;
use greenthumb::{gateway, memory, ui, Config, MemoryCommands};
use std::io::Write;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CompletionShell {
    #[value(name = "bash")]
    Bash,
    #[value(name = "fish")]
    Fish,
    #[value(name = "zsh")]
    Zsh,
    #[value(name = "powershell")]
    PowerShell,
    #[value(name = "elvish")]
    Elvish,
}

/// `GreenThumb` - a local gardening assistant that remembers your garden.
#[derive(Parser, Debug)]
#[command(name = "greenthumb")]
#[command(version)]
#[command(about = "A gardening assistant that remembers your garden.", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API gateway
    #[command(long_about = "\
Start the HTTP API gateway.

Serves POST /chat (requires the X-API-KEY header) and GET /health. \
Bind address defaults to the values in your config file \
(gateway.host / gateway.port). Set API_KEY to enable /chat.

Examples:
  greenthumb serve                  # use config defaults
  greenthumb serve -p 9000          # listen on port 9000
  greenthumb serve --host 127.0.0.1 # local only")]
    Serve {
        /// Port to listen on; defaults to config gateway.port
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to; defaults to config gateway.host
        #[arg(long)]
        host: Option<String>,
    },

    /// Start the browser chat UI
    #[command(long_about = "\
Start the browser chat UI.

Serves a single chat page backed by the same agent as the gateway. \
No API key is required, so it binds to 127.0.0.1 by default.

Examples:
  greenthumb ui
  greenthumb ui -p 8080")]
    Ui {
        /// Port to listen on; defaults to config ui.port
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to; defaults to config ui.host
        #[arg(long)]
        host: Option<String>,
    },

    /// Chat with the agent in the terminal
    #[command(long_about = "\
Chat with the agent in the terminal.

Starts an interactive session. Type /reset to clear the conversation \
and /quit to leave. Use --message for a single question.

Examples:
  greenthumb chat
  greenthumb chat -m \"Is Aloe Vera toxic to cats?\"")]
    Chat {
        /// Single message mode (don't enter interactive mode)
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Inspect or edit the garden memory file
    #[command(long_about = "\
Inspect or edit the garden memory file.

Examples:
  greenthumb memory show
  greenthumb memory get location
  greenthumb memory set plants '[\"Ficus\",\"Basil\"]'
  greenthumb memory set location Oslo
  greenthumb memory clear --yes")]
    Memory {
        #[command(subcommand)]
        memory_command: MemoryCommands,
    },

    /// Look up a plant in the gardening manual without the model
    Manual {
        /// Plant name or keywords, e.g. "rubber plant"
        query: String,
    },

    /// Print today's gardening season
    Season {
        /// Use the southern hemisphere
        #[arg(long)]
        south: bool,
    },

    /// Show configuration and data file status
    Status,

    /// Generate shell completion script to stdout
    #[command(long_about = "\
Generate shell completion scripts for `greenthumb`.

The script is printed to stdout so it can be sourced directly:

Examples:
  source <(greenthumb completions bash)
  greenthumb completions zsh > ~/.zfunc/_greenthumb
  greenthumb completions fish > ~/.config/fish/completions/greenthumb.fish")]
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(config_dir) = &cli.config_dir {
        if config_dir.trim().is_empty() {
            bail!("--config-dir cannot be empty");
        }
        std::env::set_var("GREENTHUMB_CONFIG_DIR", config_dir);
    }

    // Completions must remain stdout-only and should not load config or initialize logging.
    if let Commands::Completions { shell } = &cli.command {
        let mut stdout = std::io::stdout().lock();
        write_shell_completion(*shell, &mut stdout)?;
        return Ok(());
    }

    // Initialize logging - respects RUST_LOG env var, defaults to INFO
    let subscriber = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load_or_init().await?;

    match cli.command {
        Commands::Completions { .. } => unreachable!(),

        Commands::Serve { port, host } => {
            let port = port.unwrap_or(config.gateway.port);
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            info!("🌱 Starting GreenThumb gateway on {host}:{port}");
            gateway::run_gateway(&host, port, config).await
        }

        Commands::Ui { port, host } => {
            let port = port.unwrap_or(config.ui.port);
            let host = host.unwrap_or_else(|| config.ui.host.clone());
            info!("🌱 Starting GreenThumb chat UI on {host}:{port}");
            ui::run_ui(&host, port, config).await
        }

        Commands::Chat { message } => {
            let agent = Agent::from_config(&config).await?;
            ui::run_chat(&agent, message).await
        }

        Commands::Memory { memory_command } => {
            memory::handle_memory_command(memory_command, &config)
        }

        Commands::Manual { query } => {
            let manual = GardeningManual::load(&config.data.plants_path)?;
            println!("{}", manual.answer(&query)?);
            Ok(())
        }

        Commands::Season { south } => {
            let hemisphere = if south { "south" } else { "north" };
            let today = chrono::Local::now().date_naive();
            println!("{}", seasonal_context::describe(today, hemisphere));
            Ok(())
        }

        Commands::Status => {
            print_status(&config);
            Ok(())
        }
    }
}

fn print_status(config: &Config) {
    println!("🌱 GreenThumb Status");
    println!();
    println!("Version:     {}", env!("CARGO_PKG_VERSION"));
    println!("Config:      {}", config.config_path.display());
    println!();
    println!("🤖 Model:         {}", config.model);
    println!("   Server:        {}", config.model_url);
    println!("   Temperature:   {}", config.temperature);
    println!("   Max steps:     {}", config.agent.max_steps);
    println!();
    println!(
        "📖 Plant data:    {} ({})",
        config.data.plants_path.display(),
        match GardeningManual::load(&config.data.plants_path) {
            Ok(manual) => format!("{} plants", manual.len()),
            Err(e) => e.to_string(),
        }
    );
    let memory = GardenMemory::new(config.data.memory_path.clone());
    println!(
        "🧠 Memory:        {} ({})",
        config.data.memory_path.display(),
        match memory.load() {
            Ok(record) => format!("{} keys", record.len()),
            Err(e) => e.to_string(),
        }
    );
    println!();
    println!(
        "🌐 Gateway:       {}:{} (API key {})",
        config.gateway.host,
        config.gateway.port,
        if config.gateway.api_key.is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!("💬 Chat UI:       {}:{}", config.ui.host, config.ui.port);
}

fn write_shell_completion<W: Write>(shell: CompletionShell, writer: &mut W) -> Result<()> {
    use clap_complete::generate;
    use clap_complete::shells;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, bin_name.clone(), writer),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, bin_name.clone(), writer),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, bin_name.clone(), writer),
        CompletionShell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, bin_name.clone(), writer);
        }
        CompletionShell::Elvish => generate(shells::Elvish, &mut cmd, bin_name, writer),
    }

    writer.flush()?;
    Ok(())
}
