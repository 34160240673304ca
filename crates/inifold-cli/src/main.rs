use std::process::ExitCode;

fn main() -> ExitCode {
    inifold_cli::run()
}
