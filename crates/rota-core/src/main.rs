use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rota_core::config;
use rota_core::ipc::{self, DaemonCommand};
use rota_core::render::WheelStyle;
use rota_core::store::{FileStore, StorageKey};
use rota_core::wheel::HEADLESS_FRAME;
use rota_core::{LayerId, Wheel};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rotactl", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Storage key of the wheel to work on (defaults to the first configured wheel)
    #[arg(short = 'k', long, global = true)]
    key: Option<String>,

    /// Store file to use instead of the default data directory
    #[arg(long, global = true)]
    store: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Spin every wheel in the running app
    Spin,
    /// Stop every wheel in the running app
    Stop,
    /// Make the running app re-read the store
    Reload,
    /// List the layers of a wheel
    List,
    /// Print the sector under the pointer for every layer
    Results,
    /// Spin the stored wheel without a display and print the outcome
    Simulate {
        /// Seed for a reproducible spin
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Draw the stored wheel to a PNG file
    Render {
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Append a layer and select it
    AddLayer {
        #[arg(short, long)]
        sectors: Option<usize>,
    },
    /// Remove the selected layer (the first one unless --layer is given)
    RemoveLayer {
        #[arg(short, long)]
        layer: Option<String>,
    },
    /// Rename a layer
    Rename {
        text: String,
        #[arg(short, long)]
        layer: Option<String>,
    },
    /// Change the number of sectors of a layer
    SetSectors {
        count: usize,
        #[arg(short, long)]
        layer: Option<String>,
    },
    /// Change one sector label (1-based index)
    Label {
        index: usize,
        text: String,
        #[arg(short, long)]
        layer: Option<String>,
    },
    /// Write the default config file if there is none and print its path
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Spin => send(DaemonCommand::Spin),
        Commands::Stop => send(DaemonCommand::Stop),
        Commands::Reload => send(DaemonCommand::Reload),
        Commands::InitConfig => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
        ref command => {
            let mut wheel = open_wheel(cli.key.as_deref(), cli.store.clone())?;
            run_local(&mut wheel, command.clone())?;
            // edits reach a running app on its next reload
            if edits_layers(command)
                && let Err(e) = ipc::send_command(DaemonCommand::Reload)
            {
                log::debug!("No running app to reload: {}", e);
            }
            Ok(())
        }
    }
}

fn send(cmd: DaemonCommand) -> anyhow::Result<()> {
    ipc::send_command(cmd)?;
    Ok(())
}

fn open_wheel(key: Option<&str>, store: Option<PathBuf>) -> anyhow::Result<Wheel> {
    let config = config::load_or_default();
    let key = key.map(StorageKey::new);
    let mut settings = config.settings_for(key.as_ref());
    if let Some(key) = key {
        settings.key = key;
    }
    let store = match store {
        Some(path) => FileStore::new(path),
        None => FileStore::open_default()?,
    };
    Ok(Wheel::load(settings, Box::new(store)))
}

fn edits_layers(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Simulate { .. }
            | Commands::AddLayer { .. }
            | Commands::RemoveLayer { .. }
            | Commands::Rename { .. }
            | Commands::SetSectors { .. }
            | Commands::Label { .. }
    )
}

fn select(wheel: &mut Wheel, layer: Option<String>) -> anyhow::Result<()> {
    match layer {
        Some(id) => wheel.select_layer(&LayerId::new(id))?,
        None => {
            wheel.select_index(0);
        }
    }
    Ok(())
}

fn run_local(wheel: &mut Wheel, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List => {
            for layer in wheel.layers() {
                println!(
                    "{}\t{}\t{} sectors\t{:.1}°",
                    layer.id(),
                    layer.name(),
                    layer.sector_count(),
                    layer.rotation_deg()
                );
            }
        }
        Commands::Results => print_results(wheel),
        Commands::Simulate { seed } => {
            let now = wheel.now();
            let started = match seed {
                Some(seed) => wheel.spin_all_with(&mut StdRng::seed_from_u64(seed), now),
                None => wheel.spin_all(),
            };
            if !started {
                anyhow::bail!("Nothing to spin: the wheel has no layers");
            }
            let frames = wheel.run_to_completion(HEADLESS_FRAME);
            log::debug!("Spin settled after {} frames", frames);
            print_results(wheel);
        }
        Commands::Render { output } => {
            let style = WheelStyle {
                background: rota_core::color::hex("#0b1220"),
                ..WheelStyle::default()
            };
            wheel.render_png(&output, &style)?;
            println!("{}", output.display());
        }
        Commands::AddLayer { sectors } => {
            let id = match sectors {
                Some(n) => wheel.create_layer(n)?,
                None => wheel.create_default_layer()?,
            };
            println!("{}", id);
        }
        Commands::RemoveLayer { layer } => {
            select(wheel, layer)?;
            let removed = wheel.remove_selected_layer()?;
            println!("Removed {} ({})", removed.name(), removed.id());
        }
        Commands::Rename { text, layer } => {
            select(wheel, layer)?;
            wheel.rename_selected_layer(&text)?;
        }
        Commands::SetSectors { count, layer } => {
            select(wheel, layer)?;
            wheel.set_sector_count(count)?;
        }
        Commands::Label { index, text, layer } => {
            select(wheel, layer)?;
            let index = index
                .checked_sub(1)
                .ok_or_else(|| anyhow::anyhow!("Sector numbers start at 1"))?;
            wheel.set_sector_label(index, &text)?;
        }
        Commands::Spin | Commands::Stop | Commands::Reload | Commands::InitConfig => {}
    }
    Ok(())
}

fn print_results(wheel: &Wheel) {
    for result in wheel.results() {
        println!("{}", result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Commands {
        let mut argv = vec!["rotactl"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn test_only_edits_notify_running_app() {
        let edits: [&[&str]; 6] = [
            &["simulate", "--seed", "7"],
            &["add-layer", "--sectors", "5"],
            &["remove-layer"],
            &["rename", "Food"],
            &["set-sectors", "4", "--layer", "abc"],
            &["label", "1", "Tea"],
        ];
        for args in edits {
            assert!(edits_layers(&parse(args)), "{args:?}");
        }
        let reads: [&[&str]; 3] = [&["list"], &["results"], &["render", "-o", "out.png"]];
        for args in reads {
            assert!(!edits_layers(&parse(args)), "{args:?}");
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["rotactl", "list", "--key", "left"]).unwrap();
        assert_eq!(cli.key.as_deref(), Some("left"));
    }
}
