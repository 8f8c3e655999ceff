use serde::{Deserialize, Serialize};

/// 匯入系統期望的欄位順序
pub const CAST_COLUMNS: [&str; 27] = [
    "name",
    "age",
    "height",
    "weight",
    "bust",
    "waist",
    "hip",
    "cup_size",
    "blood_type",
    "hobby",
    "specialty",
    "profile",
    "is_new",
    "smoking_ok",
    "tattoo",
    "has_children",
    "threesome_ok",
    "hairless",
    "home_visit_ok",
    "clothing_request_ok",
    "overnight_ok",
    "sweet_sadist_ok",
    "anal_ok",
    "sm_ok",
    "cosplay_ok",
    "toy_ok",
    "lotion_ok",
];

/// Section label placed between the shop comment and the self comment.
pub const SELF_COMMENT_LABEL: &str = "【本人コメント】";

/// One cast entry in the import schema. Field order matches [`CAST_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastRecord {
    pub name: String,
    pub age: String,
    pub height: String,
    pub weight: String,
    pub bust: String,
    pub waist: String,
    pub hip: String,
    pub cup_size: String,
    pub blood_type: String,
    pub hobby: String,
    pub specialty: String,
    pub profile: String,
    pub is_new: bool,
    pub smoking_ok: bool,
    pub tattoo: bool,
    pub has_children: bool,
    pub threesome_ok: bool,
    pub hairless: bool,
    pub home_visit_ok: bool,
    pub clothing_request_ok: bool,
    pub overnight_ok: bool,
    pub sweet_sadist_ok: bool,
    pub anal_ok: bool,
    pub sm_ok: bool,
    pub cosplay_ok: bool,
    pub toy_ok: bool,
    pub lotion_ok: bool,
}

/// Fields pulled out of one source row before the service policy is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedCast {
    pub name: String,
    pub age: String,
    pub height: String,
    pub weight: String,
    pub bust: String,
    pub waist: String,
    pub hip: String,
    pub cup_size: String,
    pub blood_type: String,
    pub hobby: String,
    pub profile: String,
    pub is_new: bool,
    pub smoking_ok: bool,
}

impl CastRecord {
    /// 套用這個來源店家的固定服務設定（人妻店）
    pub fn from_extracted(cast: ExtractedCast) -> Self {
        Self {
            name: cast.name,
            age: cast.age,
            height: cast.height,
            weight: cast.weight,
            bust: cast.bust,
            waist: cast.waist,
            hip: cast.hip,
            cup_size: cast.cup_size,
            blood_type: cast.blood_type,
            hobby: cast.hobby,
            specialty: String::new(),
            profile: cast.profile,
            is_new: cast.is_new,
            smoking_ok: cast.smoking_ok,
            tattoo: false,
            has_children: true,
            threesome_ok: false,
            hairless: false,
            home_visit_ok: true,
            clothing_request_ok: true,
            overnight_ok: true,
            sweet_sadist_ok: false,
            anal_ok: false,
            sm_ok: false,
            cosplay_ok: false,
            toy_ok: true,
            lotion_ok: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub converted: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportRequest<'a> {
    #[serde(rename = "csvData")]
    pub csv_data: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub summary: ImportSummary,
    #[serde(default)]
    pub errors: Vec<RowError>,
    #[serde(default)]
    pub twitter: Option<TwitterReport>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportSummary {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub success: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default, rename = "newCasts")]
    pub new_casts: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RowError {
    #[serde(default)]
    pub row: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TwitterReport {
    #[serde(default)]
    pub attempted: u64,
    #[serde(default)]
    pub results: Vec<TwitterResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TwitterReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_fields_are_constant() {
        let record = CastRecord::from_extracted(ExtractedCast {
            name: "Yuki".to_string(),
            ..Default::default()
        });

        assert_eq!(record.specialty, "");
        assert!(record.has_children);
        assert!(!record.tattoo);
        assert!(record.home_visit_ok);
        assert!(record.toy_ok);
        assert!(!record.anal_ok);
    }

    #[test]
    fn test_import_response_parses_partial_body() {
        let body = serde_json::json!({
            "success": true,
            "summary": {"total": 5, "success": 4, "failed": 1, "newCasts": 1},
            "errors": [{"row": 3, "error": "bad date", "data": {"name": "x"}}]
        });
        let parsed: ImportResponse = serde_json::from_value(body).unwrap();

        assert!(parsed.success);
        assert_eq!(parsed.summary.new_casts, 1);
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.twitter.is_none());
    }

    #[test]
    fn test_twitter_counts() {
        let report: TwitterReport = serde_json::from_value(serde_json::json!({
            "attempted": 3,
            "results": [{"success": true}, {"success": false, "error": "rate limited"}, {"success": true}]
        }))
        .unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
    }
}
