use crate::register_preset;

/// Sixteen-digit activation code in four groups.
pub const PRESET_NAME: &str = "Activation (4x4)";

register_preset!(PRESET_NAME, 4, 4);
