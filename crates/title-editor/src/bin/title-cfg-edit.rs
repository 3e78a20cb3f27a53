use std::path::PathBuf;

use argh::FromArgs;
use colored::Colorize;
use env_logger::Env;
use title_editor::{edit_title_cfgs, ConfigOverrides, EditorConfig, Error, StdinPrompt};

#[derive(FromArgs, Debug)]
/// Review and edit the key=value entries of every title.cfg below a folder
struct Args {
    #[argh(positional, default = "PathBuf::from(\".\")")]
    /// folder to scan recursively (defaults to the current directory)
    root: PathBuf,

    #[argh(switch)]
    /// do not create title.cfg.bak before the first write
    no_backup: bool,

    #[argh(option)]
    /// TOML file with a backup setting
    config: Option<PathBuf>,
}

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("warn"));

    let args: Args = argh::from_env();
    if let Err(err) = run(args) {
        eprintln!("{} {err}", "error:".red());
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Error> {
    let overrides = ConfigOverrides {
        no_backup: args.no_backup,
        ..ConfigOverrides::default()
    };
    let config = EditorConfig::resolve(args.config.as_deref(), &overrides)?;

    let root = args.root.canonicalize().map_err(|source| Error::Read {
        path: args.root.clone(),
        source,
    })?;
    println!("Root: {}", root.display());

    let summary = edit_title_cfgs(&root, &config, &mut StdinPrompt)?;
    println!("{summary}");
    println!("{}", "Done.".green());
    Ok(())
}
