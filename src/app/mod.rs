mod runner;
mod script;

#[cfg(test)]
mod tests;

pub use runner::{SessionReport, SessionRunner};
pub use script::{ScriptStroke, SessionScript};
