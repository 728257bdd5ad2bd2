pub mod quiz_dto;
pub mod recommendation_dto;
