//! Linework command-line tool.
//!
//! Loads a line document, reports what was read and what was skipped, and
//! optionally writes the normalized document back out.
//!
//! ```text
//! lw-cli <file> [--save <out>] [--config <editor.json>]
//! ```

use lw_editor::{EditSession, EditorConfig};
use std::path::PathBuf;
use std::process::ExitCode;

struct Args {
    input: PathBuf,
    save: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut input = None;
    let mut save = None;
    let mut config = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--save" => {
                save = Some(args.next().ok_or("--save needs a path")?.into());
            }
            "--config" => {
                config = Some(args.next().ok_or("--config needs a path")?.into());
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ => return Err(format!("unexpected argument {arg}")),
        }
    }
    Ok(Args {
        input: input.ok_or("missing input file")?,
        save,
        config,
    })
}

fn run(args: Args) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            EditorConfig::from_json(&text)?
        }
        None => EditorConfig::default(),
    };

    let text = std::fs::read_to_string(&args.input)
        .map_err(|e| format!("cannot read {}: {e}", args.input.display()))?;

    let mut session = EditSession::new(config);
    let report = session.load(&text);
    let doc = session.document();
    let handles: usize = doc.visible_lines().map(|l| l.len()).sum();
    println!(
        "{}: {} lines, {} handles",
        args.input.display(),
        doc.len_visible(),
        handles
    );
    for skipped in &report.skipped {
        println!("  skipped {skipped}");
    }

    if let Some(out) = &args.save {
        std::fs::write(out, session.save())
            .map_err(|e| format!("cannot write {}: {e}", out.display()))?;
        log::info!("saved {} lines to {}", doc.len_visible(), out.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = parse_args(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("lw-cli: {e}");
            eprintln!("usage: lw-cli <file> [--save <out>] [--config <editor.json>]");
            ExitCode::FAILURE
        }
    }
}
