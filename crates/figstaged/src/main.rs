use std::process::ExitCode;

fn main() -> ExitCode {
    match figstaged::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("figstaged: {error}");
            ExitCode::FAILURE
        }
    }
}
