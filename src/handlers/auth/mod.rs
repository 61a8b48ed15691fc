pub mod confirm;
pub mod login;
pub mod password;
pub mod profile;
pub mod register;

// Re-export handler functions for use in routing
pub use confirm::confirm;
pub use login::login;
pub use password::{forgot_password, reset_password};
pub use profile::profile;
pub use register::register;
