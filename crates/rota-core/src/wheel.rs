//! The wheel aggregate: layer list, selection, spin lifecycle and the editing
//! operations an editing surface drives.

use crate::geometry::{self, CanvasSize, Point};
use crate::layer::{self, Layer, LayerId};
use crate::render::{self, RenderError, Surface, WheelStyle};
use crate::spin::{self, SpinState, SpinTuning};
use crate::store::{self, KeyValueStore, StorageKey};
use rand::Rng;
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const DEFAULT_SECTORS: usize = 6;
pub const DEFAULT_LAYERS: [usize; 3] = [8, 6, 4];
/// Frame interval used when a spin is played out without a display.
pub const HEADLESS_FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("Select a layer first")]
    NoSelection,
    #[error("Sectors must be between 2 and 24, got {0}")]
    SectorCount(usize),
    #[error("No layer with id '{0}'")]
    UnknownLayer(LayerId),
    #[error("Sector {index} does not exist, the layer has {count}")]
    SectorIndex { index: usize, count: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WheelSettings {
    pub key: StorageKey,
    pub canvas: CanvasSize,
    /// Sector counts of the layers a fresh wheel starts with.
    pub default_layers: Vec<usize>,
    pub new_layer_sectors: usize,
    pub spin: SpinTuning,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            key: StorageKey::default(),
            canvas: CanvasSize::default(),
            default_layers: DEFAULT_LAYERS.to_vec(),
            new_layer_sectors: DEFAULT_SECTORS,
            spin: SpinTuning::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No spin in progress; nothing changed.
    Idle,
    Running,
    /// The last layer stopped on this tick.
    Settled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerResult {
    pub layer_id: LayerId,
    pub layer_name: String,
    pub index: usize,
    pub label: String,
}

impl fmt::Display for LayerResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Sector {} ({})",
            self.layer_name,
            self.index + 1,
            self.label
        )
    }
}

pub struct Wheel {
    settings: WheelSettings,
    layers: Vec<Layer>,
    selected: Option<LayerId>,
    running: bool,
    store: Box<dyn KeyValueStore>,
    clock: Instant,
}

impl fmt::Debug for Wheel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wheel")
            .field("key", &self.settings.key)
            .field("layers", &self.layers)
            .field("selected", &self.selected)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl Wheel {
    /// Restores the wheel saved under the settings' key, or builds the default
    /// layers when nothing usable is stored.
    pub fn load(settings: WheelSettings, store: Box<dyn KeyValueStore>) -> Self {
        let mut wheel = Self {
            settings,
            layers: Vec::new(),
            selected: None,
            running: false,
            store,
            clock: Instant::now(),
        };
        if !wheel.restore() {
            wheel.init_default_layers();
        }
        wheel
    }

    fn restore(&mut self) -> bool {
        let Some(layers) = store::load_layers(self.store.as_ref(), &self.settings.key) else {
            return false;
        };
        log::debug!(
            "Restored {} layers from '{}'",
            layers.len(),
            self.settings.key
        );
        self.layers = layers;
        self.recompute_radii();
        self.selected = self.layers.first().map(|l| l.id.clone());
        true
    }

    fn init_default_layers(&mut self) {
        let counts = self.settings.default_layers.clone();
        for count in counts {
            if let Err(e) = self.create_layer(count) {
                log::warn!("Skipping default layer: {}", e);
            }
        }
    }

    pub fn settings(&self) -> &WheelSettings {
        &self.settings
    }

    pub fn key(&self) -> &StorageKey {
        &self.settings.key
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    pub fn selected_id(&self) -> Option<&LayerId> {
        self.selected.as_ref()
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected.as_ref().and_then(|id| self.layer(id))
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn canvas(&self) -> CanvasSize {
        self.settings.canvas
    }

    /// Monotonic time since the wheel was created.
    pub fn now(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn set_canvas(&mut self, canvas: CanvasSize) {
        if self.settings.canvas != canvas {
            self.settings.canvas = canvas;
            self.recompute_radii();
        }
    }

    pub fn set_tuning(&mut self, tuning: SpinTuning) {
        self.settings.spin = tuning;
    }

    pub fn set_new_layer_sectors(&mut self, count: usize) {
        self.settings.new_layer_sectors = count;
    }

    pub fn recompute_radii(&mut self) {
        let bounds = geometry::ring_bounds(self.layers.len(), self.settings.canvas);
        for (layer, b) in self.layers.iter_mut().zip(bounds) {
            layer.bounds = b;
        }
    }

    /// Layer whose ring contains `point`, if any.
    pub fn layer_at(&self, point: Point) -> Option<&LayerId> {
        let radius = point.distance_to(self.settings.canvas.center());
        self.layers
            .iter()
            .find(|l| l.bounds.contains(radius))
            .map(|l| &l.id)
    }

    fn selected_position(&self) -> Result<usize, EditError> {
        let id = self.selected.as_ref().ok_or(EditError::NoSelection)?;
        self.layers
            .iter()
            .position(|l| &l.id == id)
            .ok_or_else(|| EditError::UnknownLayer(id.clone()))
    }

    fn unused_id(&self) -> LayerId {
        let mut rng = rand::rng();
        loop {
            let id = LayerId::generate(&mut rng);
            if self.layer(&id).is_none() {
                return id;
            }
        }
    }

    pub fn create_default_layer(&mut self) -> Result<LayerId, EditError> {
        self.create_layer(self.settings.new_layer_sectors)
    }

    /// Appends a ring with numbered sectors and selects it.
    pub fn create_layer(&mut self, sector_count: usize) -> Result<LayerId, EditError> {
        if !layer::sector_count_in_range(sector_count) {
            return Err(EditError::SectorCount(sector_count));
        }
        let id = self.unused_id();
        let name = layer::default_layer_name(self.layers.len());
        log::debug!("Creating layer '{}' ({}) with {} sectors", name, id, sector_count);
        self.layers.push(Layer::new(id.clone(), name, sector_count));
        self.recompute_radii();
        self.selected = Some(id.clone());
        self.save();
        Ok(id)
    }

    pub fn select_layer(&mut self, id: &LayerId) -> Result<(), EditError> {
        if self.layer(id).is_none() {
            return Err(EditError::UnknownLayer(id.clone()));
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    pub fn select_index(&mut self, index: usize) -> Option<&LayerId> {
        let id = self.layers.get(index)?.id.clone();
        self.selected = Some(id);
        self.selected.as_ref()
    }

    /// Removes the selected layer and selects the first remaining one.
    pub fn remove_selected_layer(&mut self) -> Result<Layer, EditError> {
        let pos = self.selected_position()?;
        let removed = self.layers.remove(pos);
        log::debug!("Removed layer '{}' ({})", removed.name, removed.id);
        self.recompute_radii();
        self.selected = self.layers.first().map(|l| l.id.clone());
        self.save();
        Ok(removed)
    }

    /// Blank names fall back to `Layer <position>`.
    pub fn rename_selected_layer(&mut self, name: &str) -> Result<(), EditError> {
        let pos = self.selected_position()?;
        let name = name.trim();
        self.layers[pos].name = if name.is_empty() {
            layer::default_layer_name(pos)
        } else {
            name.to_string()
        };
        self.save();
        Ok(())
    }

    /// Grows with numbered sectors or truncates from the end. Ring radii do
    /// not depend on sector counts and stay as they are.
    pub fn set_sector_count(&mut self, count: usize) -> Result<(), EditError> {
        let pos = self.selected_position()?;
        if !layer::sector_count_in_range(count) {
            return Err(EditError::SectorCount(count));
        }
        self.layers[pos].resize_sectors(count);
        self.save();
        Ok(())
    }

    /// Blank labels fall back to `Item <index>`.
    pub fn set_sector_label(&mut self, index: usize, label: &str) -> Result<(), EditError> {
        let pos = self.selected_position()?;
        let layer = &mut self.layers[pos];
        let count = layer.sector_count();
        let sector = layer
            .sectors
            .get_mut(index)
            .ok_or(EditError::SectorIndex { index, count })?;
        sector.label = label_or_default(label, index);
        self.save();
        Ok(())
    }

    /// Replaces the leading labels of the selected layer in one go.
    pub fn set_sector_labels<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<(), EditError> {
        let pos = self.selected_position()?;
        let layer = &mut self.layers[pos];
        let count = layer.sector_count();
        if labels.len() > count {
            return Err(EditError::SectorIndex {
                index: labels.len() - 1,
                count,
            });
        }
        for (index, (sector, label)) in layer.sectors.iter_mut().zip(labels).enumerate() {
            sector.label = label_or_default(label.as_ref(), index);
        }
        self.save();
        Ok(())
    }

    /// Starts spinning every layer. Does nothing while a spin is running or
    /// when there are no layers.
    pub fn spin_all(&mut self) -> bool {
        let now = self.now();
        self.spin_all_with(&mut rand::rng(), now)
    }

    pub fn spin_all_with<R: Rng>(&mut self, rng: &mut R, now: Duration) -> bool {
        if self.running || self.layers.is_empty() {
            return false;
        }
        for (i, layer) in self.layers.iter_mut().enumerate() {
            let start = layer.rotation_deg % 360.0;
            layer.rotation_deg = start;
            layer.spin = SpinState::plan(rng, &self.settings.spin, i, start, now);
            layer.resolved_index = None;
        }
        self.running = true;
        log::info!(
            "Spinning {} layers on '{}'",
            self.layers.len(),
            self.settings.key
        );
        true
    }

    /// One animation frame using the wheel's own clock.
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.now();
        self.tick_at(now)
    }

    pub fn tick_at(&mut self, now: Duration) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        if spin::advance(&mut self.layers, now) {
            return TickOutcome::Running;
        }
        self.finish();
        TickOutcome::Settled
    }

    /// Lands every layer on its nearest sector right away.
    pub fn stop_all(&mut self) -> Vec<LayerResult> {
        for layer in &mut self.layers {
            layer.settle();
        }
        self.finish();
        self.results()
    }

    fn finish(&mut self) {
        self.running = false;
        for result in self.results() {
            log::info!("{}", result);
        }
        self.save();
    }

    /// Plays a running spin out with synthetic frames. Returns the number of
    /// frames it took.
    pub fn run_to_completion(&mut self, frame: Duration) -> usize {
        let frame = if frame.is_zero() { HEADLESS_FRAME } else { frame };
        let mut now = self.now();
        let mut frames = 0;
        while self.running {
            now += frame;
            frames += 1;
            self.tick_at(now);
        }
        frames
    }

    pub fn results(&self) -> Vec<LayerResult> {
        self.layers
            .iter()
            .map(|l| {
                let index = l.result_index();
                LayerResult {
                    layer_id: l.id.clone(),
                    layer_name: l.name.clone(),
                    index,
                    label: l.sectors[index].label.clone(),
                }
            })
            .collect()
    }

    /// Re-reads the stored layer list. Ignored while spinning.
    pub fn reload(&mut self) -> bool {
        if self.running {
            return false;
        }
        let selected = self.selected.clone();
        if !self.restore() {
            return false;
        }
        if let Some(id) = selected.filter(|id| self.layer(id).is_some()) {
            self.selected = Some(id);
        }
        true
    }

    pub fn save(&mut self) {
        if let Err(e) = store::save_layers(self.store.as_mut(), &self.settings.key, &self.layers)
        {
            log::error!("Failed to save wheel '{}': {}", self.settings.key, e);
        }
    }

    pub fn draw<S: Surface>(&self, surface: &mut S, style: &WheelStyle) -> Result<(), S::Error> {
        render::draw(surface, &self.layers, self.settings.canvas, style)
    }

    pub fn render_png(&self, path: &Path, style: &WheelStyle) -> Result<(), RenderError> {
        render::render_png(&self.layers, self.settings.canvas, style, path)
    }
}

fn label_or_default(label: &str, index: usize) -> String {
    let label = label.trim();
    if label.is_empty() {
        layer::default_label(index)
    } else {
        label.to_string()
    }
}
