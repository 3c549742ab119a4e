//! Entry point for the locale parity checker.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use i18n_catalog::cli::{
    self,
    Args,
};
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let _guard = setup_tracing(args.verbose);

    let result = cli::run(&args, &mut io::stdout().lock()).await;
    if let Err(e) = &result {
        tracing::error!("{e}");
    }
    ExitCode::from(cli::exit_code(&result))
}

/// ログを標準エラーへ出力するように設定する
fn setup_tracing(verbose: bool) -> WorkerGuard {
    use tracing_subscriber::EnvFilter;

    let (writer, guard) = tracing_appender::non_blocking(io::stderr());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("i18n_catalog=debug,i18n_parity=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
    guard
}
