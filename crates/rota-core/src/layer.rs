use crate::geometry::RingBounds;
use crate::sector::{self, MAX_SECTORS, MIN_SECTORS};
use crate::spin::SpinState;
use derive_more::{AsRef, Deref, Display, From, Into};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct LayerId(String);

crate::impl_string_newtype!(LayerId);

impl LayerId {
    /// Base-36 wall-clock milliseconds followed by a random suffix.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self(format!("{}{}", to_base36(millis), rng.random_range(0..1000u32)))
    }
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub label: String,
}

impl Sector {
    pub fn numbered(index: usize) -> Self {
        Self {
            label: default_label(index),
        }
    }
}

pub fn default_label(index: usize) -> String {
    format!("Item {}", index + 1)
}

pub fn default_layer_name(position: usize) -> String {
    format!("Layer {}", position + 1)
}

pub fn sector_count_in_range(count: usize) -> bool {
    (MIN_SECTORS..=MAX_SECTORS).contains(&count)
}

/// One concentric ring of the wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayerRecord", into = "LayerRecord")]
pub struct Layer {
    pub(crate) id: LayerId,
    pub(crate) name: String,
    pub(crate) sectors: Vec<Sector>,
    pub(crate) rotation_deg: f64,
    pub(crate) spin: SpinState,
    /// Sector that settled under the pointer, cleared when the sector layout
    /// changes.
    pub(crate) resolved_index: Option<usize>,
    pub(crate) bounds: RingBounds,
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>, sector_count: usize) -> Self {
        Self {
            id,
            name: name.into(),
            sectors: (0..sector_count).map(Sector::numbered).collect(),
            rotation_deg: 0.0,
            spin: SpinState::Idle,
            resolved_index: None,
            bounds: RingBounds::default(),
        }
    }

    pub fn id(&self) -> &LayerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    pub fn spin_state(&self) -> &SpinState {
        &self.spin
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.is_spinning()
    }

    pub fn bounds(&self) -> RingBounds {
        self.bounds
    }

    pub fn resolved_index(&self) -> Option<usize> {
        self.resolved_index
    }

    /// Sector under the pointer for the current rotation.
    pub fn sector_under_pointer(&self) -> usize {
        sector::resolve_sector(self.rotation_deg, self.sectors.len())
    }

    /// Settled sector if known, otherwise whatever the pointer shows now.
    pub fn result_index(&self) -> usize {
        self.resolved_index
            .filter(|&i| i < self.sectors.len())
            .unwrap_or_else(|| self.sector_under_pointer())
    }

    /// Stops the layer on the midpoint of the sector under the pointer.
    pub fn settle(&mut self) -> usize {
        let snap = sector::snap_rotation(self.rotation_deg, self.sectors.len());
        self.rotation_deg = snap.normalized();
        self.spin = SpinState::Idle;
        self.resolved_index = Some(snap.index);
        snap.index
    }

    pub(crate) fn resize_sectors(&mut self, count: usize) {
        let current = self.sectors.len();
        if count > current {
            self.sectors.extend((current..count).map(Sector::numbered));
        } else {
            self.sectors.truncate(count);
        }
        self.resolved_index = None;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayerRecord {
    id: LayerId,
    name: String,
    sectors: Vec<Sector>,
    #[serde(default)]
    rotation_deg: f64,
    #[serde(default)]
    is_spinning: bool,
}

impl TryFrom<LayerRecord> for Layer {
    type Error = String;

    fn try_from(record: LayerRecord) -> Result<Self, Self::Error> {
        if !sector_count_in_range(record.sectors.len()) {
            return Err(format!(
                "layer '{}' has {} sectors, expected {MIN_SECTORS}..={MAX_SECTORS}",
                record.id,
                record.sectors.len()
            ));
        }
        if !record.rotation_deg.is_finite() {
            return Err(format!("layer '{}' has a non-finite rotation", record.id));
        }

        let mut layer = Layer {
            id: record.id,
            name: record.name,
            sectors: record.sectors,
            rotation_deg: sector::normalize_deg(record.rotation_deg),
            spin: SpinState::Idle,
            resolved_index: None,
            bounds: RingBounds::default(),
        };
        // the animation that was running is gone; land it where it stands
        if record.is_spinning {
            layer.settle();
        }
        Ok(layer)
    }
}

impl From<Layer> for LayerRecord {
    fn from(layer: Layer) -> Self {
        Self {
            is_spinning: layer.is_spinning(),
            id: layer.id,
            name: layer.name,
            sectors: layer.sectors,
            rotation_deg: layer.rotation_deg,
        }
    }
}
