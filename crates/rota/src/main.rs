use relm4::prelude::*;
use rota::config;
use rota::gui::app::AppModel;
use rota::sys::runtime;
use rota_core::Wheel;
use rota_core::store::FileStore;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = config::load_or_default();
    let store_path = FileStore::default_path()?;
    let wheels: Vec<Wheel> = config
        .wheel_settings()
        .into_iter()
        .map(|settings| Wheel::load(settings, Box::new(FileStore::new(&store_path))))
        .collect();

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx);

    let app = RelmApp::new("org.rota.rota");

    app.run::<AppModel>((wheels, rx));
    Ok(())
}
