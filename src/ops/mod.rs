pub mod check;
pub mod edit_ops;
pub mod item_ops;
pub mod migrate;
pub mod move_ops;
pub mod tree;
