pub mod amount;
pub mod colors;
pub mod date;
pub mod formatting;
pub mod table;
