//! termhop binary entry point.

use std::process::ExitCode;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

use termhop::cli::{self, Args};
use termhop::config::Config;
use termhop::{logging, Session};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("Run with --help for usage.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _ = logging::init_with_level(Some(config.log_filter()));
    info!("termhop v{}", env!("CARGO_PKG_VERSION"));

    let mut session = match build_session(&args, &config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    match session.connect().await {
        Ok(message) => eprintln!("{message}"),
        Err(e) => {
            error!(error = %e, "connect failed");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    }

    let status = match run_repl(&mut session).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "session aborted");
            ExitCode::FAILURE
        }
    };

    session.disconnect().await;
    status
}

fn build_session(args: &Args, config: &Config) -> Result<Session, cli::ArgsError> {
    let session_config = config.session_config();
    Ok(match args.ssh_credentials(config.ssh.port)? {
        Some(credentials) => Session::ssh(credentials, session_config),
        None => Session::local(session_config),
    })
}

/// Read command lines from stdin until `exit` or end of input.
async fn run_repl(session: &mut Session) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let prompt = format!("{}$ ", session.tracked_directory().unwrap_or("?"));
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            stdout.write_all(b"\n").await?;
            break;
        };
        let line = line.trim();

        let reply = match line {
            "exit" | "quit" => break,
            ":pwd" => session.tracked_directory().unwrap_or("").to_string(),
            _ if line.starts_with(":complete") => {
                let partial = line[":complete".len()..].trim_start();
                session.get_completions(partial).await.join("\n")
            }
            _ => match session.execute_command(line).await {
                Ok(result) if result.success => result.output,
                Ok(result) => format!("error: {}", result.output),
                Err(e) => format!("error: {e}"),
            },
        };

        if !reply.is_empty() {
            stdout.write_all(reply.trim_end_matches('\n').as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
    }

    stdout.flush().await
}
