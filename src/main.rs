use std::env;
use std::fs;
use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::EnvFilter;

use matchc::core::emit;

const USAGE: &str = "Usage: matchc <spec-file> <input-file>\n       matchc <spec-file> --emit <output.rs>";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let Some(spec_path) = args.next() else {
        eprintln!("{USAGE}");
        return ExitCode::from(1);
    };
    let Some(mode) = args.next() else {
        eprintln!("{USAGE}");
        return ExitCode::from(1);
    };

    let source = match fs::read_to_string(&spec_path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("{spec_path}: {err}");
            return ExitCode::from(1);
        }
    };

    let artifacts = match matchc::build(&source) {
        Ok(artifacts) => artifacts,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(1);
        }
    };
    info!(
        rules = artifacts.spec.symbols.len(),
        entries = artifacts.program.entries.len(),
        "compiled {spec_path}"
    );

    if mode == "--emit" {
        let Some(out_path) = args.next() else {
            eprintln!("{USAGE}");
            return ExitCode::from(1);
        };
        let generated = emit::emit(&artifacts.program);
        if let Err(err) = fs::write(&out_path, generated) {
            eprintln!("{out_path}: {err}");
            return ExitCode::from(1);
        }
        info!("wrote matcher to {out_path}");
        return ExitCode::SUCCESS;
    }

    let input = match fs::read(&mode) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("{mode}: {err}");
            return ExitCode::from(1);
        }
    };
    let verdict = artifacts.program.accepts(&input);
    println!("{}", if verdict { "ACCEPTS" } else { "REJECTS" });
    ExitCode::SUCCESS
}
