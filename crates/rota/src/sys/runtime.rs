use crate::events::AppEvent;
use async_channel::Sender;
use std::thread;
use tokio::runtime::Builder;

/// Runs the command socket and the config watcher on their own thread. Both
/// report to the GUI through `tx`.
pub fn start_background_services(tx: Sender<AppEvent>) {
    let spawned = thread::Builder::new()
        .name("rota-services".into())
        .spawn(move || {
            let rt = match Builder::new_multi_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("Failed to create Tokio runtime: {}", e);
                    return;
                }
            };

            rt.block_on(async move {
                let server = tokio::spawn(crate::sys::server::run_server(tx.clone()));
                let watcher = tokio::spawn(crate::config::run_async_watcher(tx));

                // neither task returns while the app is healthy
                for (name, task) in [("command server", server), ("config watcher", watcher)] {
                    if let Err(e) = task.await {
                        log::error!("Background {} failed: {}", name, e);
                    } else {
                        log::warn!("Background {} stopped", name);
                    }
                }
            });
        });

    if let Err(e) = spawned {
        log::error!("Failed to start background services: {}", e);
    }
}
