pub mod ask;

pub use ask::{AskRequest, CredentialLookup, QuestionService};
