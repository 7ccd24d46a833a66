pub mod backend;
pub mod error;
pub mod fuzzy;
pub mod knowledge;
pub mod matcher;
pub mod preprocess;
pub mod region;
pub mod session;
pub mod store;
pub mod timer;

#[cfg(test)]
mod tests;
