//! API request/response types

use crate::db::Hike;
use crate::state_machine::FlowState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub user_id: i64,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Prompts produced while handling this message, in send order.
    pub replies: Vec<String>,
    /// Flow state after the message was processed.
    pub state: FlowState,
}

#[derive(Debug, Deserialize)]
pub struct ListHikesParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct HikeListResponse {
    pub hikes: Vec<Hike>,
}

#[derive(Debug, Deserialize)]
pub struct SetPublishedRequest {
    pub published: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
