//! Command-line interface for termhop.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::transport::SshCredentials;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Remote target as `user@host`; local shell when absent.
    pub ssh: Option<String>,
    /// SSH port (overrides config).
    pub port: Option<u16>,
    /// Private key file for SSH.
    pub identity: Option<PathBuf>,
    /// Name of an environment variable holding the SSH password.
    pub password_env: Option<String>,
    /// Initial directory for local sessions.
    pub directory: Option<String>,
    /// Shell program for local sessions.
    pub shell: Option<String>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

impl Args {
    /// SSH credentials described by these arguments, if remote mode was
    /// requested. `default_port` applies when `--port` was not given.
    pub fn ssh_credentials(&self, default_port: u16) -> Result<Option<SshCredentials>, ArgsError> {
        let Some(target) = &self.ssh else {
            return Ok(None);
        };
        let mut creds = SshCredentials::parse_target(target)
            .ok_or_else(|| ArgsError::InvalidValue("ssh", target.clone()))?
            .port(self.port.unwrap_or(default_port));

        if let Some(key) = &self.identity {
            creds = creds.key_file(key);
        } else if let Some(var) = &self.password_env {
            let password =
                std::env::var(var).map_err(|_| ArgsError::MissingEnv(var.clone()))?;
            creds = creds.password(password);
        }
        Ok(Some(creds))
    }
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('s') | Long("ssh") => {
                let value: String = parser.value()?.parse()?;
                if SshCredentials::parse_target(&value).is_none() {
                    return Err(ArgsError::InvalidValue("ssh", value));
                }
                result.ssh = Some(value);
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("port", value))?,
                );
            }
            Short('i') | Long("identity") => {
                result.identity = Some(parser.value()?.parse()?);
            }
            Long("password-env") => {
                result.password_env = Some(parser.value()?.parse()?);
            }
            Short('C') | Long("directory") => {
                result.directory = Some(parser.value()?.parse()?);
            }
            Long("shell") => {
                result.shell = Some(parser.value()?.parse()?);
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"termhop {version}
Directory-tracking command sessions over local and SSH shells

USAGE:
    termhop [OPTIONS]

OPTIONS:
    -s, --ssh <USER@HOST>     Connect to a remote host instead of the local shell
    -p, --port <PORT>         SSH port [default: 22]
    -i, --identity <FILE>     Private key for SSH
        --password-env <VAR>  Read the SSH password from this environment variable
    -C, --directory <DIR>     Initial directory (local sessions)
        --shell <PROGRAM>     Shell for local sessions [default: sh]
    -c, --config <FILE>       Path to configuration file (JSON)
    -l, --log-level <LVL>     Log level (error, warn, info, debug, trace)
    -h, --help                Print help
    -V, --version             Print version

SESSION COMMANDS:
    :pwd                      Print the tracked directory
    :complete <TEXT>          List shell completions for TEXT
    exit                      Disconnect and quit

ENVIRONMENT VARIABLES:
    TERMHOP_SSH_PORT            SSH port (overrides config)
    TERMHOP_SSH_TIMEOUT         Connect timeout in seconds
    TERMHOP_COMMAND_TIMEOUT     Command timeout in seconds
    TERMHOP_COMPLETION_TIMEOUT  Completion timeout in seconds
    TERMHOP_LOG_LEVEL           Log level (overrides config)
    RUST_LOG                    Alternative log level setting

EXAMPLES:
    # Local shell
    termhop

    # Remote host with a key
    termhop -s deploy@example.com -i ~/.ssh/id_ed25519

    # Remote host with a password from the environment
    SSH_PW=secret termhop -s admin@10.0.0.5 --password-env SSH_PW
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("termhop {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
    /// `--password-env` names an unset variable.
    MissingEnv(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
            Self::MissingEnv(var) => {
                write!(f, "environment variable {} is not set", var)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
