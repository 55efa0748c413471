pub mod components;
pub mod config;
pub mod constants;
pub mod events;
pub mod map;
pub mod resources;
pub mod session;
pub mod systems;

pub use components::{EntityId, Facing, SiteId};
pub use config::{ConfigResult, GameConfig};
pub use events::GameEvent;
pub use resources::{GameMode, Outcome, RoundSummary};
pub use session::GameSession;
pub use systems::ui::HudView;
