use crate::events::AppEvent;
use async_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::time::Duration;

pub use rota_core::config::*;

/// Quiet period after the last file event before the config is re-read.
const DEBOUNCE: Duration = Duration::from_millis(250);

/// Watches the config directory and emits one [`AppEvent::ConfigReload`] per
/// burst of changes to the config file.
pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let Some(config_dir) = config_path.parent().map(|p| p.to_path_buf()) else {
        return;
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        if !touches_config(res, &config_path) {
            continue;
        }
        // editors save in several steps; wait for the burst to end
        loop {
            match tokio::time::timeout(DEBOUNCE, bridge_rx.recv()).await {
                Ok(Ok(_)) => continue,
                Ok(Err(_)) => return,
                Err(_) => break,
            }
        }
        if tx.send(AppEvent::ConfigReload).await.is_err() {
            break;
        }
    }
}

fn touches_config(res: notify::Result<Event>, config_path: &Path) -> bool {
    match res {
        Ok(event) => {
            is_config_change(&event.kind) && event.paths.iter().any(|p| p == config_path)
        }
        Err(e) => {
            log::error!("Watch error: {}", e);
            false
        }
    }
}

fn is_config_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    #[test]
    fn test_config_change_kinds() {
        assert!(is_config_change(&EventKind::Create(CreateKind::File)));
        assert!(is_config_change(&EventKind::Modify(ModifyKind::Any)));
        assert!(!is_config_change(&EventKind::Access(AccessKind::Any)));
    }

    #[test]
    fn test_only_config_file_events_count() {
        let config = Path::new("/cfg/rota/config.toml");
        let modify = |path: &str| {
            Ok(Event::new(EventKind::Modify(ModifyKind::Any)).add_path(path.into()))
        };
        assert!(touches_config(modify("/cfg/rota/config.toml"), config));
        assert!(!touches_config(modify("/cfg/rota/config.toml.swp"), config));
        assert!(!touches_config(
            Ok(Event::new(EventKind::Access(AccessKind::Any)).add_path(config.into())),
            config
        ));
        assert!(!touches_config(Err(notify::Error::generic("boom")), config));
    }
}
