pub mod ai_service;
pub mod quiz_service;
pub mod recommendation_service;
pub mod resource_service;
pub mod result_service;
pub mod scoring;
pub mod session_service;
pub mod video_service;
