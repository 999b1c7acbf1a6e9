pub mod analysis;
pub mod history;
pub mod resume;
pub mod user;
