//! Browser automation adapter

pub mod webdriver;

pub use webdriver::{launch_args, WebDriverSession};
