//! The three family mini-games as plain state machines. Nothing here talks
//! to the server; a UI renders the state and feeds input back in.

pub mod drawing;
pub mod memory;
pub mod quiz;

pub use drawing::DrawingBoard;
pub use memory::MemoryGame;
pub use quiz::QuizGame;
