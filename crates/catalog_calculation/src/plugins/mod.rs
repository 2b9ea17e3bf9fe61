//! Built-in catalog calculation plugins

mod extendedness;
mod footprint_area;

pub use extendedness::{ClassificationExtendedness, ClassificationExtendednessConfig};
pub use footprint_area::{FootprintArea, FootprintAreaConfig};

use crate::error::Result;
use crate::registry::PluginRegistry;

/// Register every built-in plugin under its conventional name
pub fn register_builtin_plugins(registry: &mut PluginRegistry) -> Result<()> {
    registry.register::<ClassificationExtendedness>("base_ClassificationExtendedness")?;
    registry.register::<FootprintArea>("base_FootprintArea")?;
    Ok(())
}
