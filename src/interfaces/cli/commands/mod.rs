mod config_gen;
mod generate;

pub use config_gen::config_generate;
pub use generate::{GenerateArgs, generate_room, photo_name_from_url};
