use duotune::model::Theme;
use std::path::PathBuf;

#[derive(Debug, Default, PartialEq)]
enum Mode {
    #[default]
    Select,
    Play(PathBuf),
}

#[derive(Debug, Default)]
struct CliArgs {
    mode: Mode,
    items: Vec<String>,
    theme: Option<Theme>,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;
    let _log_guard = duotune::logging::init()?;
    tracing::info!(mode = ?args.mode, "starting duotune");

    let options = duotune::app::AppStartupOptions { theme: args.theme };
    match args.mode {
        Mode::Select => duotune::app::run_selector(args.items, options),
        Mode::Play(path) => duotune::app::run_player(&path, options),
    }
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    let mut command_seen = false;
    while index < args.len() {
        match args[index].as_str() {
            "--theme" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--theme requires a name");
                };
                let Some(theme) = Theme::parse(value) else {
                    anyhow::bail!("unknown theme {value}");
                };
                out.theme = Some(theme);
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "select" if !command_seen => command_seen = true,
            "play" if !command_seen => {
                command_seen = true;
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("play requires a file path");
                };
                if value.trim().is_empty() {
                    anyhow::bail!("play path cannot be empty");
                }
                out.mode = Mode::Play(PathBuf::from(value));
            }
            other if other.starts_with("--") => anyhow::bail!("unknown argument {other}"),
            other => {
                if matches!(out.mode, Mode::Play(_)) {
                    anyhow::bail!("unexpected argument {other}");
                }
                command_seen = true;
                out.items.push(other.to_string());
            }
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("duotune");
    println!("  select [items..]    Pick elements between two lists (default)");
    println!("  play <path>         Play one audio file");
    println!("  --theme name        dark, pitch-black or matrix");
}
