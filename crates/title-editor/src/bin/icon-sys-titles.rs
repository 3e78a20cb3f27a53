use std::path::PathBuf;

use argh::FromArgs;
use colored::Colorize;
use env_logger::Env;
use title_editor::config::parse_int;
use title_editor::{edit_icon_sys_titles, ConfigOverrides, EditorConfig, Error, StdinPrompt};

#[derive(FromArgs, Debug)]
/// Edit the two title lines stored in every icon.sys below a folder
struct Args {
    #[argh(positional, default = "PathBuf::from(\".\")")]
    /// folder to scan recursively (defaults to the current directory)
    root: PathBuf,

    #[argh(switch)]
    /// do not create icon.sys.bak before the first write
    no_backup: bool,

    #[argh(option, from_str_fn(parse_int))]
    /// byte offset of the title block (decimal or 0x hex, default 0xC0)
    offset: Option<usize>,

    #[argh(option, from_str_fn(parse_int))]
    /// length of the title block in bytes (default 68)
    block_len: Option<usize>,

    #[argh(option)]
    /// TOML file with backup and [icon_sys] settings
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
        offset: args.offset,
        block_len: args.block_len,
    };
    let config = EditorConfig::resolve(args.config.as_deref(), &overrides)?;
    log::debug!("resolved configuration: {config:?}");

    let root = args.root.canonicalize().map_err(|source| Error::Read {
        path: args.root.clone(),
        source,
    })?;
    println!("Root: {}", root.display());
    println!(
        "{}",
        format!(
            "Title block @0x{:X}, {} bytes",
            config.icon_sys.offset, config.icon_sys.block_len
        )
        .dimmed()
    );

    let summary = edit_icon_sys_titles(&root, &config, &mut StdinPrompt)?;
    println!("{summary}");
    println!("{}", "Done.".green());
    Ok(())
}
