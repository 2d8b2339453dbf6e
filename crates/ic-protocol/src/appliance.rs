use std::collections::{BTreeSet, HashMap};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A controllable appliance a room may be equipped with.
///
/// Declaration order is the canonical iteration order: the schema builder
/// and the prompt composer both walk appliances in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplianceKind {
    Ac,
    CeilingFan,
    Window,
    Door,
    ExhaustFan,
}

impl ApplianceKind {
    /// Every known appliance, in canonical order.
    pub const ALL: [ApplianceKind; 5] = [
        ApplianceKind::Ac,
        ApplianceKind::CeilingFan,
        ApplianceKind::Window,
        ApplianceKind::Door,
        ApplianceKind::ExhaustFan,
    ];

    /// Wire identifier (e.g. `"CEILING_FAN"`).
    pub fn as_str(self) -> &'static str {
        match self {
            ApplianceKind::Ac => "AC",
            ApplianceKind::CeilingFan => "CEILING_FAN",
            ApplianceKind::Window => "WINDOW",
            ApplianceKind::Door => "DOOR",
            ApplianceKind::ExhaustFan => "EXHAUST_FAN",
        }
    }

    /// Match a loosely formatted appliance name ("Ceiling Fan", "ac", "EXHAUST_FAN").
    ///
    /// Comparison is case-insensitive with spaces treated as underscores.
    /// Unknown names return `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        let normalized = key.trim().to_ascii_uppercase().replace(' ', "_");
        Self::ALL.into_iter().find(|k| k.as_str() == normalized)
    }
}

impl std::fmt::Display for ApplianceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The subset of appliances present in a room.
///
/// Serializes as a presence map over every known appliance
/// (`{"AC": true, "CEILING_FAN": false, ...}`). Deserializing ignores keys
/// that do not name a known appliance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<String, bool>")]
pub struct ApplianceSet {
    present: BTreeSet<ApplianceKind>,
}

impl ApplianceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, kind: ApplianceKind) -> Self {
        self.present.insert(kind);
        self
    }

    pub fn insert(&mut self, kind: ApplianceKind) {
        self.present.insert(kind);
    }

    pub fn remove(&mut self, kind: ApplianceKind) {
        self.present.remove(&kind);
    }

    pub fn contains(&self, kind: ApplianceKind) -> bool {
        self.present.contains(&kind)
    }

    /// Present appliances in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = ApplianceKind> + '_ {
        self.present.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.present.len()
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    /// Build from `(name, present)` flags. Unknown names are skipped.
    pub fn from_flags<'a, I>(flags: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let present = flags
            .into_iter()
            .filter(|(_, present)| *present)
            .filter_map(|(name, _)| ApplianceKind::from_key(name))
            .collect();
        Self { present }
    }
}

impl From<HashMap<String, bool>> for ApplianceSet {
    fn from(map: HashMap<String, bool>) -> Self {
        Self::from_flags(map.iter().map(|(k, v)| (k.as_str(), *v)))
    }
}

impl FromIterator<ApplianceKind> for ApplianceSet {
    fn from_iter<I: IntoIterator<Item = ApplianceKind>>(iter: I) -> Self {
        Self {
            present: iter.into_iter().collect(),
        }
    }
}

impl Serialize for ApplianceSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ApplianceKind::ALL.len()))?;
        for kind in ApplianceKind::ALL {
            map.serialize_entry(kind.as_str(), &self.contains(kind))?;
        }
        map.end()
    }
}

/// Air conditioner operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcMode {
    Off,
    Cool,
    Fan,
}

impl AcMode {
    pub const VARIANTS: &'static [&'static str] = &["OFF", "COOL", "FAN"];
}

/// Door / window position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpeningState {
    Open,
    Closed,
}

impl OpeningState {
    pub const VARIANTS: &'static [&'static str] = &["OPEN", "CLOSED"];
}

/// On/off switch state (exhaust fan).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwitchState {
    On,
    Off,
}

impl SwitchState {
    pub const VARIANTS: &'static [&'static str] = &["ON", "OFF"];
}
