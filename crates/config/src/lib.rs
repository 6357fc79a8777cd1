mod settings;

pub use settings::{DatabaseSettings, InviteSettings, Settings};
