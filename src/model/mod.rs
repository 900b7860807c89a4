pub mod token;

pub use token::ParsedInstruction;
pub use token::TokenCreationEvent;
pub use token::WatcherStatus;
