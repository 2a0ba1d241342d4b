pub mod human;
pub mod trainer;

pub use human::HumanMode;
pub use trainer::{Command, TrainerApp, TrainerConfig};
