pub mod equipment;
pub mod g_functions;
pub mod geothermal;
pub mod heat_pump;
pub mod methodology;

pub use equipment::{EquipmentSizer, SystemSizing};
pub use geothermal::{GeothermalLoopSizer, GeothermalLoopSizing};
pub use methodology::{SizingStage, StagedCapacity};
