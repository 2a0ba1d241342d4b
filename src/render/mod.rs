pub mod renderer;
pub mod sprites;
pub mod trainer_view;

pub use renderer::Renderer;
pub use sprites::SpriteSet;
pub use trainer_view::{Notice, NoticeLevel, Overlay, TrainerView};
