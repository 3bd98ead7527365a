pub mod health;
pub mod pages;
pub mod search;

pub use health::*;
pub use pages::*;
pub use search::*;
