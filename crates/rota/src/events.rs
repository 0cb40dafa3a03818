use rota_core::ipc::DaemonCommand;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Spin,
    Stop,
    Reload,
    ConfigReload,
}

impl From<DaemonCommand> for AppEvent {
    fn from(cmd: DaemonCommand) -> Self {
        match cmd {
            DaemonCommand::Spin => AppEvent::Spin,
            DaemonCommand::Stop => AppEvent::Stop,
            DaemonCommand::Reload => AppEvent::Reload,
        }
    }
}
