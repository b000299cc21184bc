/// Database row types — these map directly to SQLite rows.
/// Handlers render from these; nothing here is serialized over the wire.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub fullname: Option<String>,
    pub village: Option<String>,
    pub contact: String,
    pub joined_date: String,
    pub profile_image: Option<String>,
    pub banner_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub contact: String,
    pub category: Option<String>,
    pub eligibility: Option<String>,
    pub salary: Option<String>,
    pub deadline: Option<String>,
    pub user_id: i64,
    pub posted_date: String,
}

#[derive(Debug, Clone)]
pub struct SchemeRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub eligibility: Option<String>,
    pub how_to_apply: Option<String>,
    pub deadline: Option<String>,
    pub agency: Option<String>,
    pub contact: Option<String>,
    pub website: Option<String>,
    pub posted_date: String,
}

#[derive(Debug, Clone)]
pub struct IssueRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: Option<String>,
    pub image: Option<String>,
    pub user_id: i64,
    pub reported_date: String,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub location: Option<String>,
    pub contact: String,
    pub category: Option<String>,
    pub image: Option<String>,
    pub user_id: i64,
    pub posted_date: String,
}

#[derive(Debug, Clone)]
pub struct ApplicationRow {
    pub id: i64,
    pub job_id: i64,
    pub user_id: i64,
    pub name: String,
    pub phone: String,
    pub experience: Option<String>,
    pub message: Option<String>,
    pub application_date: String,
    pub status: String,
}

/// Application joined with the columns of its job that listings display.
#[derive(Debug, Clone)]
pub struct ApplicationWithJob {
    pub application: ApplicationRow,
    pub job_title: String,
    pub job_category: Option<String>,
    pub job_location: Option<String>,
    pub job_deadline: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessionRow {
    pub token: String,
    pub user_id: Option<i64>,
    pub language: String,
    pub flashes: String,
    pub created_at: String,
}

// -- Insert payloads --

#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub fullname: &'a str,
    pub village: &'a str,
    pub contact: &'a str,
}

#[derive(Debug)]
pub struct NewJob<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub location: &'a str,
    pub contact: &'a str,
    pub category: &'a str,
    pub eligibility: &'a str,
    pub salary: &'a str,
    pub deadline: &'a str,
    pub user_id: i64,
}

#[derive(Debug)]
pub struct NewIssue<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub location: &'a str,
    pub category: &'a str,
    pub image: Option<&'a str>,
    pub user_id: i64,
}

#[derive(Debug)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: &'a str,
    pub location: &'a str,
    pub contact: &'a str,
    pub category: &'a str,
    pub image: Option<&'a str>,
    pub user_id: i64,
}

#[derive(Debug)]
pub struct NewApplication<'a> {
    pub job_id: i64,
    pub user_id: i64,
    pub name: &'a str,
    pub phone: &'a str,
    pub experience: &'a str,
    pub message: &'a str,
}
