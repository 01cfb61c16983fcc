use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::Period;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct PeriodCreate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(alias = "academicYear")]
    #[validate(length(min = 1, message = "academic_year must not be empty"))]
    pub(crate) academic_year: String,
    #[serde(default)]
    #[serde(alias = "advisorQuota")]
    pub(crate) advisor_quota: Option<i32>,
    #[serde(default)]
    #[serde(alias = "cardNumberFormat")]
    pub(crate) card_number_format: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PeriodResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) academic_year: String,
    pub(crate) is_active: bool,
    pub(crate) advisor_quota: i32,
    pub(crate) card_number_format: String,
}

impl PeriodResponse {
    pub(crate) fn from_db(period: Period) -> Self {
        Self {
            id: period.id,
            name: period.name,
            academic_year: period.academic_year,
            is_active: period.is_active,
            advisor_quota: period.advisor_quota,
            card_number_format: period.card_number_format,
        }
    }
}
