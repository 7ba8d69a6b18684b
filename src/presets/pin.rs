use crate::register_preset;

/// Four-digit PIN, one block.
pub const PRESET_NAME: &str = "PIN (1x4)";

register_preset!(PRESET_NAME, 1, 4);
