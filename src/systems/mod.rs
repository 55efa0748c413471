pub mod build;
pub mod collision;
pub mod enemy;
pub mod game_state;
pub mod powerup;
pub mod projectile;
pub mod tower;
pub mod ui;
pub mod wave;

pub use build::*;
pub use collision::*;
pub use enemy::*;
pub use game_state::*;
pub use powerup::*;
pub use projectile::*;
pub use tower::*;
pub use ui::*;
pub use wave::*;
