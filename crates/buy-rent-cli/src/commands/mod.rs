pub mod evaluate;
pub mod fields;
