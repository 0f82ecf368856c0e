use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};

use sievers_dom::model::profile::CapabilityProfile;
use sievers_dom::sieve::{Capabilities, Document, Grammar};
use sievers_dom::store::{profile_store, script_io};

/// Inspect and reformat Sieve filter scripts without losing a byte of layout
#[derive(Parser, Debug)]
#[command(name = "sievers-dom")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    capabilities: CapabilityArgs,

    /// Log more (repeat for debug and trace output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CapabilityArgs {
    /// Start from the capabilities of a saved profile
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Enable a capability (may be repeated)
    #[arg(long = "capability", global = true)]
    capabilities: Vec<String>,

    /// Enable every capability the grammar knows about
    #[arg(long, global = true)]
    all_capabilities: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a script and report whether it is valid
    Check { file: PathBuf },

    /// Parse a script, add missing requires and print it
    Format {
        file: PathBuf,

        /// Write the result back instead of printing it
        #[arg(long)]
        write: bool,
    },

    /// Print the capabilities a script uses
    Requires { file: PathBuf },

    /// Print the node tree as JSON
    Tree { file: PathBuf },

    /// Manage saved capability profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// List saved profiles
    List,
    /// Save (or replace) a profile
    Save {
        name: String,
        capabilities: Vec<String>,
    },
    /// Remove a profile
    Remove { name: String },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_capabilities(args: &CapabilityArgs, grammar: &Grammar) -> Result<Capabilities, Box<dyn std::error::Error>> {
    let mut capabilities = Capabilities::default();
    if let Some(name) = &args.profile {
        let profiles = profile_store::load_profiles()?;
        let profile = profile_store::find_profile(&profiles, name)
            .ok_or_else(|| format!("no profile named \"{name}\""))?;
        capabilities = profile.to_capabilities();
    }
    if args.all_capabilities {
        for name in grammar.capability_names() {
            capabilities.enable(name);
        }
    }
    for name in &args.capabilities {
        capabilities.enable(name);
    }
    info!(count = capabilities.len(), "capabilities selected");
    Ok(capabilities)
}

fn open(path: &Path, capabilities: &Capabilities) -> Result<Document, Box<dyn std::error::Error>> {
    let text = script_io::load_normalized(path).map_err(|err| format!("{}: {err}", path.display()))?;
    let document = Document::parse(Grammar::standard(), capabilities.clone(), &text)
        .map_err(|err| format!("{}: {err}", path.display()))?;
    Ok(document)
}

fn run_profile(command: ProfileCommand) -> CliResult {
    let mut profiles = profile_store::load_profiles()?;
    match command {
        ProfileCommand::List => {
            for profile in &profiles {
                println!("{}: {}", profile.name, profile.capabilities.join(" "));
            }
        }
        ProfileCommand::Save { name, capabilities } => {
            let profile = CapabilityProfile::new(&name, &capabilities);
            match profiles.iter_mut().find(|p| p.name == name) {
                Some(existing) => *existing = profile,
                None => profiles.push(profile),
            }
            profile_store::save_profiles(&profiles)?;
        }
        ProfileCommand::Remove { name } => {
            let before = profiles.len();
            profiles.retain(|p| p.name != name);
            if profiles.len() == before {
                return Err(format!("no profile named \"{name}\"").into());
            }
            profile_store::save_profiles(&profiles)?;
        }
    }
    Ok(())
}

fn run(cli: Cli) -> CliResult {
    let grammar = Grammar::standard();
    let command = match cli.command {
        Command::Profile { command } => return run_profile(command),
        command => command,
    };
    let capabilities = resolve_capabilities(&cli.capabilities, &grammar)?;

    match command {
        Command::Check { file } => {
            let document = open(&file, &capabilities)?;
            println!("{}: ok ({} nodes)", file.display(), document.node_count());
        }
        Command::Format { file, write } => {
            let mut document = open(&file, &capabilities)?;
            let script = document.to_script()?;
            if write {
                script_io::save_script(&file, &script)?;
                info!(path = %file.display(), "script written");
            } else {
                print!("{script}");
            }
        }
        Command::Requires { file } => {
            let document = open(&file, &capabilities)?;
            for name in document.collect_requirements()? {
                println!("{name}");
            }
        }
        Command::Tree { file } => {
            let document = open(&file, &capabilities)?;
            let outline = document.outline(document.root()?)?;
            println!("{}", serde_json::to_string_pretty(&outline)?);
        }
        Command::Profile { .. } => {}
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
