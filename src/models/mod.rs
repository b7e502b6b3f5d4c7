pub mod batch;
pub mod event;
pub mod loaders;
pub mod order;
pub mod settings;
pub mod stage;

pub use batch::{Batch, PriorityKey};
pub use event::{EventKind, PipelineEvent};
pub use loaders::{load_orders, load_settings_or_default, parse_orders};
pub use order::{flatten_orders, max_row_quantity, OrderRecord, OrderRow};
pub use settings::PipelineSettings;
pub use stage::{StageSequence, StageSpec};
