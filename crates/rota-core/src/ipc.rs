//! Line-based command channel between `rotactl` and the running app.

use std::io::Write;
use std::os::unix::net::UnixStream;
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

pub const SOCKET_PATH: &str = "/tmp/rota.sock";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DaemonCommand {
    /// Spin every wheel.
    Spin,
    /// Stop every wheel on its nearest sector.
    Stop,
    /// Re-read saved layers from the store.
    Reload,
}

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("Failed to connect to rota at {path}: {source}. Is rota running?")]
    Connect {
        path: &'static str,
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn send_command(cmd: DaemonCommand) -> Result<(), IpcError> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|source| IpcError::Connect {
        path: SOCKET_PATH,
        source,
    })?;
    writeln!(stream, "{}", cmd)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_command_parsing() {
        let cases = vec![
            ("spin", DaemonCommand::Spin),
            ("SPIN", DaemonCommand::Spin),
            ("stop", DaemonCommand::Stop),
            ("Reload", DaemonCommand::Reload),
        ];
        for (line, expected) in cases {
            assert_eq!(DaemonCommand::from_str(line).unwrap(), expected);
        }
        assert!(DaemonCommand::from_str("show").is_err());
    }

    #[test]
    fn test_commands_round_trip_through_text() {
        for cmd in DaemonCommand::iter() {
            assert_eq!(DaemonCommand::from_str(&cmd.to_string()).unwrap(), cmd);
        }
    }
}
