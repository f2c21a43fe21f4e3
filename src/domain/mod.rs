pub mod feed;
pub mod item;

pub use feed::{Credentials, Feed, Image};
pub use item::Item;
