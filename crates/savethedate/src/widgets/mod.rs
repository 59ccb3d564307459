pub mod countdown;
pub mod deck;
pub mod gallery;
