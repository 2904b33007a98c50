pub mod console;
pub mod key;

pub use console::Console;
pub use key::Key;
