#[allow(clippy::module_inception)]
pub mod launcher;
mod process;

pub use launcher::Launcher;
