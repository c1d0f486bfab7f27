use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::profile::repo::UserProfile;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub birthday: Option<Date>,
    pub height: Option<f64>,
    pub height_unit: Option<String>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub background: Option<String>,
    pub training_goal: Option<String>,
    pub training_experience: Option<String>,
    pub injury_caution_area: Option<String>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(u: UserProfile) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            birthday: u.birthday,
            height: u.height,
            height_unit: u.height_unit,
            weight: u.weight,
            weight_unit: u.weight_unit,
            background: u.background,
            training_goal: u.training_goal,
            training_experience: u.training_experience,
            injury_caution_area: u.injury_caution_area,
        }
    }
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<Date>,
    pub height: Option<f64>,
    pub height_unit: Option<String>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub background: Option<String>,
    pub training_goal: Option<String>,
    pub training_experience: Option<String>,
    pub injury_caution_area: Option<String>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.birthday.is_none()
            && self.height.is_none()
            && self.height_unit.is_none()
            && self.weight.is_none()
            && self.weight_unit.is_none()
            && self.background.is_none()
            && self.training_goal.is_none()
            && self.training_experience.is_none()
            && self.injury_caution_area.is_none()
    }
}
