use crate::register_preset;

/// Six-digit SMS verification code, split in the middle.
pub const PRESET_NAME: &str = "SMS code (2x3)";

register_preset!(PRESET_NAME, 2, 3);
