use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use shellkit_core::{App, Command, ExitStatus, ShellConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shellkit-demo")]
#[command(about = "Interactive demo shell", version)]
struct Cli {
    /// Application name (defaults to the executable name).
    #[arg(long)]
    name: Option<String>,
    /// YAML or JSON shell configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Register no default commands or sub-commands.
    #[arg(long)]
    no_defaults: bool,
    /// Prompt written before each line.
    #[arg(long)]
    prompt: Option<String>,
    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli) {
        Ok(ExitStatus::Shell) => println!("shell closed"),
        Ok(status) => debug!(?status, "exiting"),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<ExitStatus, shellkit_core::ShellError> {
    let mut config = match &cli.config {
        Some(path) => ShellConfig::load(path)?,
        None => ShellConfig::default(),
    };
    if cli.name.is_some() {
        config.name = cli.name;
    }
    if let Some(prompt) = cli.prompt {
        config.prompt = prompt;
    }
    if cli.no_defaults {
        config.default_commands = false;
        config.default_sub_commands = false;
    }

    let mut app = App::builder("").config(&config).build()?;
    app.add_command(hello_command())?;
    app.add_command(echo_command())?;

    Ok(app.run())
}

fn hello_command() -> Command {
    Command::new("hello")
        .with_synopsis("print a greeting")
        .with_usage("${name} ${shortFlags}:\n\nPrint a greeting followed by -top.\n\n${flags}")
        .with_flags(|ctx| {
            let top = ctx.flags_mut().int("top", 12, "example top-level flag");
            ctx.set("top", top);
        })
        .with_main(|ctx| {
            let top: i64 = ctx.must_get("top");
            ctx.app().println(format_args!("Hello world! {top}"));
            ExitStatus::Cmd
        })
        .with_sub_command(
            Command::new("secondary")
                .with_synopsis("print a second-level greeting")
                .with_usage("${fullName} ${shortFlags}\n\n${flags}")
                .with_flags(|ctx| {
                    let second = ctx.flags_mut().int("second", 21, "example second-level flag");
                    ctx.set("second", second);
                })
                .with_main(|ctx| {
                    let second: i64 = ctx.must_get("second");
                    ctx.app().println(format_args!("Hello second world! {second}"));
                    ExitStatus::Cmd
                }),
        )
}

fn echo_command() -> Command {
    Command::new("echo")
        .with_synopsis("print the arguments")
        .with_usage("${name} [<arg>...]")
        .with_main(|ctx| {
            ctx.app().println(ctx.args().join(" "));
            ExitStatus::Cmd
        })
}

fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    if subscriber.try_init().is_err() {
        eprintln!("Warning: tracing subscriber already installed");
    }
}
