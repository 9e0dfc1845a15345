pub mod anim;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod events;
pub mod index;
pub mod ir;
pub mod layout;
pub mod scene_dump;
pub mod text_metrics;
pub mod theme;

pub use anim::{AnimationPlan, Timeline, diff_scenes};
pub use config::{Config, LayoutConfig, load_config};
pub use events::ChartEvent;
pub use index::DataIndex;
pub use ir::{ChartSpec, SpecError};
pub use layout::{LayoutOutput, Rect, Scene, compute_layout};
pub use theme::Theme;

#[cfg(feature = "cli")]
pub use cli::run;
