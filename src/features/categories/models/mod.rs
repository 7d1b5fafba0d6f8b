mod category;

pub use category::{Category, CategoryData};
