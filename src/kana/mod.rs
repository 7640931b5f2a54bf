pub mod table;

pub use table::{Column, Kana, Row, TABLE, lookup};
