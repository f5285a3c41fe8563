pub mod mongodb;
pub mod poll;
pub mod principal;
pub mod view;
pub mod vote;
