use once_cell::sync::Lazy;
use std::sync::Mutex;

pub mod activation;
pub mod pin;
pub mod sms;

#[macro_export]
macro_rules! register_preset {
    ($name:expr, $blocks:expr, $elements:expr) => {
        #[ctor::ctor] // runs at program startup
        fn register() {
            crate::presets::register_preset(crate::presets::FieldPreset {
                name: $name,
                blocks: $blocks,
                elements_in_block: $elements,
            });
        }
    };
}

/// A named field geometry. Selecting a different preset discards the whole
/// slot sequence and rebuilds the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldPreset {
    pub name: &'static str,
    pub blocks: usize,
    pub elements_in_block: usize,
}

pub static PRESET_REGISTRY: Lazy<Mutex<Vec<FieldPreset>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn register_preset(preset: FieldPreset) {
    let mut registry = PRESET_REGISTRY.lock().unwrap();
    // ctor runs in link order; keep the list stable for the selector.
    let at = registry
        .iter()
        .position(|p| p.name > preset.name)
        .unwrap_or(registry.len());
    registry.insert(at, preset);
}

pub fn get_preset_by_name(name: &str) -> Option<FieldPreset> {
    PRESET_REGISTRY
        .lock()
        .unwrap()
        .iter()
        .find(|p| p.name == name)
        .copied()
}

pub fn get_preset_by_index(idx: usize) -> Option<FieldPreset> {
    PRESET_REGISTRY.lock().unwrap().get(idx).copied()
}
