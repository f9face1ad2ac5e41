use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Minimal job record shown in list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_id: String,
    pub job_title: String,
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub salary_range: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub work_type: String,
}

impl JobSummary {
    /// Case-insensitive containment match against title or company.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        self.job_title.to_lowercase().contains(&needle)
            || self.company.to_lowercase().contains(&needle)
    }
}

/// Company record nested inside a job detail. Upstream keys are capitalised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    #[serde(rename = "CEO", deserialize_with = "null_as_default")]
    pub ceo: String,
    #[serde(rename = "Zip", deserialize_with = "null_as_default")]
    pub zip: String,
    #[serde(rename = "City", deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(rename = "State", deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(rename = "Sector", deserialize_with = "null_as_default")]
    pub sector: String,
    #[serde(rename = "Ticker", deserialize_with = "null_as_default")]
    pub ticker: String,
    #[serde(rename = "Website", deserialize_with = "null_as_default")]
    pub website: String,
    #[serde(rename = "Industry", deserialize_with = "null_as_default")]
    pub industry: String,
}

/// Full job record shown in the detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub summary: JobSummary,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub responsibilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub benefits: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub qualifications: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_profile: CompanyProfile,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_posting_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub longitude: f64,
    #[serde(default)]
    pub company_size: Option<u32>,
    #[serde(default)]
    pub preference: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub job_portal: Option<String>,
}

impl JobDetail {
    pub fn job_id(&self) -> &str {
        &self.summary.job_id
    }
}
