pub mod shutdown;
pub mod telegram;
