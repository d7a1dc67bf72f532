pub mod completion;
pub mod search;
