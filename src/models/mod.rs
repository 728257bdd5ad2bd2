pub mod catalog;
pub mod question;
pub mod quiz;
pub mod recommendation;
pub mod resource;
pub mod result;
