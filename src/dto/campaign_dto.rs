use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::campaign::{CampaignStatus, CampaignType};
use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCampaignPayload {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub name: String,
    pub campaign_type: CampaignType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignListQuery {
    pub status: Option<CampaignStatus>,
}
