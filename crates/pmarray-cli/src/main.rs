use std::ffi::OsString;
use std::io;
use std::process::ExitCode;

use pmarray_cli::{run, LOG_ENV, POOL_SIZE_ENV};

fn main() -> ExitCode {
    setup_tracing();

    let args: Vec<OsString> = std::env::args_os().collect();
    let pool_size = std::env::var_os(POOL_SIZE_ENV).map(|v| v.to_string_lossy().into_owned());
    let result = run(
        &args,
        pool_size.as_deref(),
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    );

    match result {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
