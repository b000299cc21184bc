use serde::Deserialize;

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub village: String,
    #[serde(default)]
    pub contact: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// -- Jobs --

#[derive(Debug, Deserialize)]
pub struct NewJobForm {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub contact: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub eligibility: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub deadline: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    pub category: Option<String>,
}

// -- Marketplace --

#[derive(Debug, Deserialize)]
pub struct MarketQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

// -- Locale --

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    pub next: Option<String>,
}
