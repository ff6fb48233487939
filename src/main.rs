use clap::{CommandFactory, Parser};

mod commands;
mod output;

use commands::new::{self, NewArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROG: &str = "skeleton";

#[derive(Parser)]
#[command(name = PROG)]
#[command(version = VERSION)]
#[command(about = "Scaffold the test layout, build script and CI config for a component")]
#[command(override_usage = "skeleton [options]")]
struct Cli {
    #[command(flatten)]
    args: NewArgs,
}

fn main() -> std::process::ExitCode {
    // Unknown options exit here through clap with status 2.
    let cli = Cli::parse();
    let args = cli.args;

    if !args.new {
        return usage_error(args.json);
    }

    let result = new::run(&args);

    if args.json {
        let (json_result, exit_code) = output::map_cmd_result_to_json(result);
        if output::print_json_result(json_result).is_err() {
            return std::process::ExitCode::from(1);
        }
        return std::process::ExitCode::from(exit_code_to_u8(exit_code));
    }

    // Skip notices were already printed while the scaffold ran.
    match result {
        Ok((_, exit_code)) => std::process::ExitCode::from(exit_code_to_u8(exit_code)),
        Err(err) => {
            output::print_error_text(PROG, &err);
            std::process::ExitCode::from(exit_code_to_u8(output::exit_code_for_error(err.code)))
        }
    }
}

/// Help on stderr plus a diagnostic, exit 2.
fn usage_error(json: bool) -> std::process::ExitCode {
    if json {
        let err = skeleton::Error::validation_missing_argument(vec!["--new".to_string()])
            .with_hint("Run 'skeleton --new [--dir DIR]' to generate a component skeleton");
        let (json_result, exit_code) =
            output::map_cmd_result_to_json::<serde_json::Value>(Err(err));
        // Best effort; the exit code carries the failure either way.
        let _ = output::print_json_result(json_result);
        return std::process::ExitCode::from(exit_code_to_u8(exit_code));
    }

    eprintln!("{}", Cli::command().render_help());
    eprintln!("\n{}: error: please enter options", PROG);
    std::process::ExitCode::from(2)
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
