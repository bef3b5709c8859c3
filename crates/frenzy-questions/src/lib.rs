pub mod bank;
pub mod provider;

pub use bank::{BankEntry, QuestionBank};
pub use provider::{DeckProvider, DeckStats};
