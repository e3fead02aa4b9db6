pub mod search;
pub mod wc;
