//! Name translation between configuration keys and model variable names.
//!
//! Configuration keys use underscores (`num_sheep`) so they can double as
//! column names; the simulation model names its globals with hyphens
//! (`num-sheep`). Both directions are pure string rewrites.

/// Convert a configuration key into the name the model uses.
pub fn to_model_name(key: &str) -> String {
    key.replace('_', "-")
}

/// Convert a model variable name into a configuration key.
pub fn to_config_key(name: &str) -> String {
    name.replace('-', "_")
}
