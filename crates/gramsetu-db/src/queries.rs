use crate::models::{
    ApplicationRow, ApplicationWithJob, IssueRow, JobRow, NewApplication, NewIssue, NewJob,
    NewProduct, NewUser, ProductRow, SchemeRow, SessionRow, UserRow,
};
use crate::{Database, now_stamp};
use anyhow::Result;
use rusqlite::{OptionalExtension, Row, params};

impl Database {
    // -- Users --

    pub fn create_user(&self, user: &NewUser) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (username, password, fullname, village, contact, joined_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.username,
                    user.password_hash,
                    user.fullname,
                    user.village,
                    user.contact,
                    now_stamp(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, username, password, fullname, village, contact, joined_date,
                            profile_image, banner_image
                     FROM users WHERE username = ?1",
                    [username],
                    map_user,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, username, password, fullname, village, contact, joined_date,
                            profile_image, banner_image
                     FROM users WHERE id = ?1",
                    [id],
                    map_user,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Full profile update: text fields plus both image references.
    /// Callers pass the surviving image names (prior ones if no new upload).
    pub fn update_profile(
        &self,
        id: i64,
        fullname: &str,
        village: &str,
        contact: &str,
        profile_image: Option<&str>,
        banner_image: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users
                 SET fullname = ?1, village = ?2, contact = ?3, profile_image = ?4, banner_image = ?5
                 WHERE id = ?6",
                params![fullname, village, contact, profile_image, banner_image, id],
            )?;
            Ok(())
        })
    }

    pub fn set_profile_image(&self, id: i64, filename: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET profile_image = ?1 WHERE id = ?2",
                params![filename, id],
            )?;
            Ok(())
        })
    }

    // -- Jobs --

    pub fn insert_job(&self, job: &NewJob) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO jobs
                 (title, description, location, contact, category, eligibility, salary, deadline, user_id, posted_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    job.title,
                    job.description,
                    job.location,
                    job.contact,
                    job.category,
                    job.eligibility,
                    job.salary,
                    job.deadline,
                    job.user_id,
                    now_stamp(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_jobs(&self, category: Option<&str>) -> Result<Vec<JobRow>> {
        self.with_conn(|conn| {
            let rows = match category {
                Some(category) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, title, description, location, contact, category, eligibility,
                                salary, deadline, user_id, posted_date
                         FROM jobs WHERE category = ?1
                         ORDER BY posted_date DESC, id DESC",
                    )?;
                    let rows = stmt
                        .query_map([category], map_job)?
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    rows
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, title, description, location, contact, category, eligibility,
                                salary, deadline, user_id, posted_date
                         FROM jobs
                         ORDER BY posted_date DESC, id DESC",
                    )?;
                    let rows = stmt
                        .query_map([], map_job)?
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    rows
                }
            };
            Ok(rows)
        })
    }

    pub fn get_job(&self, id: i64) -> Result<Option<JobRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, title, description, location, contact, category, eligibility,
                            salary, deadline, user_id, posted_date
                     FROM jobs WHERE id = ?1",
                    [id],
                    map_job,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn list_jobs_by_user(&self, user_id: i64) -> Result<Vec<JobRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, location, contact, category, eligibility,
                        salary, deadline, user_id, posted_date
                 FROM jobs WHERE user_id = ?1
                 ORDER BY posted_date DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([user_id], map_job)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Schemes --

    pub fn list_schemes(&self) -> Result<Vec<SchemeRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, eligibility, how_to_apply, deadline, agency,
                        contact, website, posted_date
                 FROM schemes
                 ORDER BY posted_date DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([], map_scheme)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_scheme(&self, id: i64) -> Result<Option<SchemeRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, title, description, eligibility, how_to_apply, deadline, agency,
                            contact, website, posted_date
                     FROM schemes WHERE id = ?1",
                    [id],
                    map_scheme,
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Issues --

    pub fn insert_issue(&self, issue: &NewIssue) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO issues
                 (title, description, location, category, image, user_id, reported_date, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'Pending')",
                params![
                    issue.title,
                    issue.description,
                    issue.location,
                    issue.category,
                    issue.image,
                    issue.user_id,
                    now_stamp(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_issues(&self) -> Result<Vec<IssueRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, location, category, image, user_id,
                        reported_date, status
                 FROM issues
                 ORDER BY reported_date DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([], map_issue)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_issues_by_user(&self, user_id: i64) -> Result<Vec<IssueRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, location, category, image, user_id,
                        reported_date, status
                 FROM issues WHERE user_id = ?1
                 ORDER BY reported_date DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([user_id], map_issue)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Products --

    pub fn insert_product(&self, product: &NewProduct) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO products
                 (name, description, price, location, contact, category, image, user_id, posted_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    product.name,
                    product.description,
                    product.price,
                    product.location,
                    product.contact,
                    product.category,
                    product.image,
                    product.user_id,
                    now_stamp(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Marketplace listing. `category` and `search` combine with AND; the
    /// search term matches name or description as a substring (SQLite LIKE,
    /// ASCII case-insensitive). The WHERE clause is assembled dynamically but
    /// every user value is bound, never interpolated.
    pub fn list_products(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<ProductRow>> {
        self.with_conn(|conn| {
            let mut sql = String::from(
                "SELECT id, name, description, price, location, contact, category, image,
                        user_id, posted_date
                 FROM products",
            );
            let mut clauses: Vec<&str> = Vec::new();
            let mut bound: Vec<String> = Vec::new();

            if let Some(category) = category {
                clauses.push("category = ?");
                bound.push(category.to_string());
            }
            if let Some(search) = search {
                clauses.push("(name LIKE ? OR description LIKE ?)");
                let pattern = format!("%{}%", search);
                bound.push(pattern.clone());
                bound.push(pattern);
            }
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" ORDER BY posted_date DESC, id DESC");

            let mut stmt = conn.prepare(&sql)?;
            let bound_refs: Vec<&dyn rusqlite::types::ToSql> = bound
                .iter()
                .map(|v| v as &dyn rusqlite::types::ToSql)
                .collect();
            let rows = stmt
                .query_map(bound_refs.as_slice(), map_product)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_products_by_user(&self, user_id: i64) -> Result<Vec<ProductRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, description, price, location, contact, category, image,
                        user_id, posted_date
                 FROM products WHERE user_id = ?1
                 ORDER BY posted_date DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([user_id], map_product)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Job applications --

    pub fn get_application(&self, user_id: i64, job_id: i64) -> Result<Option<ApplicationRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, job_id, user_id, name, phone, experience, message,
                            application_date, status
                     FROM job_applications WHERE user_id = ?1 AND job_id = ?2",
                    params![user_id, job_id],
                    map_application,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Atomic upsert keyed on (job, user): first submission inserts with a
    /// Pending status; a resubmission overwrites the mutable fields and the
    /// timestamp in place, leaving status alone. The UNIQUE constraint makes
    /// concurrent submissions collapse to one row.
    pub fn upsert_application(&self, app: &NewApplication) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO job_applications
                 (job_id, user_id, name, phone, experience, message, application_date, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'Pending')
                 ON CONFLICT(job_id, user_id) DO UPDATE SET
                    name = excluded.name,
                    phone = excluded.phone,
                    experience = excluded.experience,
                    message = excluded.message,
                    application_date = excluded.application_date",
                params![
                    app.job_id,
                    app.user_id,
                    app.name,
                    app.phone,
                    app.experience,
                    app.message,
                    now_stamp(),
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_applications_with_jobs(&self, user_id: i64) -> Result<Vec<ApplicationWithJob>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT a.id, a.job_id, a.user_id, a.name, a.phone, a.experience, a.message,
                        a.application_date, a.status,
                        j.title, j.category, j.location, j.deadline
                 FROM job_applications a
                 JOIN jobs j ON a.job_id = j.id
                 WHERE a.user_id = ?1
                 ORDER BY a.application_date DESC, a.id DESC",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(ApplicationWithJob {
                        application: map_application(row)?,
                        job_title: row.get(9)?,
                        job_category: row.get(10)?,
                        job_location: row.get(11)?,
                        job_deadline: row.get(12)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Sessions --

    pub fn create_session(
        &self,
        token: &str,
        user_id: Option<i64>,
        language: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO sessions (token, user_id, language) VALUES (?1, ?2, ?3)",
                params![token, user_id, language],
            )?;
            Ok(())
        })
    }

    pub fn get_session(&self, token: &str) -> Result<Option<SessionRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT token, user_id, language, flashes, created_at
                     FROM sessions WHERE token = ?1",
                    [token],
                    |row| {
                        Ok(SessionRow {
                            token: row.get(0)?,
                            user_id: row.get(1)?,
                            language: row.get(2)?,
                            flashes: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn delete_session(&self, token: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
            Ok(())
        })
    }

    pub fn set_session_language(&self, token: &str, language: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE sessions SET language = ?1 WHERE token = ?2",
                params![language, token],
            )?;
            Ok(())
        })
    }

    /// Append a one-time notice to the session. Read-modify-write is safe
    /// here: all writes go through the single connection mutex.
    pub fn push_flash(&self, token: &str, message: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let stored: Option<String> = conn
                .query_row(
                    "SELECT flashes FROM sessions WHERE token = ?1",
                    [token],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(stored) = stored else {
                return Ok(());
            };
            let mut flashes: Vec<String> =
                serde_json::from_str(&stored).unwrap_or_default();
            flashes.push(message.to_string());
            conn.execute(
                "UPDATE sessions SET flashes = ?1 WHERE token = ?2",
                params![serde_json::to_string(&flashes)?, token],
            )?;
            Ok(())
        })
    }

    /// Drain all pending notices for the session.
    pub fn take_flashes(&self, token: &str) -> Result<Vec<String>> {
        self.with_conn_mut(|conn| {
            let stored: Option<String> = conn
                .query_row(
                    "SELECT flashes FROM sessions WHERE token = ?1",
                    [token],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(stored) = stored else {
                return Ok(Vec::new());
            };
            let flashes: Vec<String> = serde_json::from_str(&stored).unwrap_or_default();
            if !flashes.is_empty() {
                conn.execute(
                    "UPDATE sessions SET flashes = '[]' WHERE token = ?1",
                    [token],
                )?;
            }
            Ok(flashes)
        })
    }
}

fn map_user(row: &Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        fullname: row.get(3)?,
        village: row.get(4)?,
        contact: row.get(5)?,
        joined_date: row.get(6)?,
        profile_image: row.get(7)?,
        banner_image: row.get(8)?,
    })
}

fn map_job(row: &Row) -> rusqlite::Result<JobRow> {
    Ok(JobRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        location: row.get(3)?,
        contact: row.get(4)?,
        category: row.get(5)?,
        eligibility: row.get(6)?,
        salary: row.get(7)?,
        deadline: row.get(8)?,
        user_id: row.get(9)?,
        posted_date: row.get(10)?,
    })
}

fn map_scheme(row: &Row) -> rusqlite::Result<SchemeRow> {
    Ok(SchemeRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        eligibility: row.get(3)?,
        how_to_apply: row.get(4)?,
        deadline: row.get(5)?,
        agency: row.get(6)?,
        contact: row.get(7)?,
        website: row.get(8)?,
        posted_date: row.get(9)?,
    })
}

fn map_issue(row: &Row) -> rusqlite::Result<IssueRow> {
    Ok(IssueRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        location: row.get(3)?,
        category: row.get(4)?,
        image: row.get(5)?,
        user_id: row.get(6)?,
        reported_date: row.get(7)?,
        status: row.get(8)?,
    })
}

fn map_product(row: &Row) -> rusqlite::Result<ProductRow> {
    Ok(ProductRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        location: row.get(4)?,
        contact: row.get(5)?,
        category: row.get(6)?,
        image: row.get(7)?,
        user_id: row.get(8)?,
        posted_date: row.get(9)?,
    })
}

fn map_application(row: &Row) -> rusqlite::Result<ApplicationRow> {
    Ok(ApplicationRow {
        id: row.get(0)?,
        job_id: row.get(1)?,
        user_id: row.get(2)?,
        name: row.get(3)?,
        phone: row.get(4)?,
        experience: row.get(5)?,
        message: row.get(6)?,
        application_date: row.get(7)?,
        status: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn add_user(db: &Database, username: &str) -> i64 {
        db.create_user(&NewUser {
            username,
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$hashhashhash",
            fullname: "Test User",
            village: "Rampur",
            contact: "9876543210",
        })
        .unwrap()
    }

    fn add_job(db: &Database, user_id: i64, title: &str, category: &str) -> i64 {
        db.insert_job(&NewJob {
            title,
            description: "desc",
            location: "Rampur",
            contact: "9876543210",
            category,
            eligibility: "",
            salary: "",
            deadline: "",
            user_id,
        })
        .unwrap()
    }

    #[test]
    fn migrations_are_idempotent_and_seed_once() {
        let db = test_db();
        db.with_conn(|conn| {
            crate::migrations::run(conn)?;
            crate::migrations::run(conn)?;
            Ok(())
        })
        .unwrap();
        let schemes = db.list_schemes().unwrap();
        assert_eq!(schemes.len(), 3);
    }

    #[test]
    fn user_roundtrip() {
        let db = test_db();
        let id = add_user(&db, "asha");

        let by_name = db.get_user_by_username("asha").unwrap().unwrap();
        assert_eq!(by_name.id, id);
        assert_eq!(by_name.contact, "9876543210");
        assert!(by_name.profile_image.is_none());

        assert!(db.get_user_by_username("nobody").unwrap().is_none());
        assert!(db.get_user_by_id(id + 100).unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let db = test_db();
        add_user(&db, "asha");
        let result = db.create_user(&NewUser {
            username: "asha",
            password_hash: "x",
            fullname: "",
            village: "",
            contact: "1",
        });
        assert!(result.is_err());
        let count: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn profile_update_preserves_passed_images() {
        let db = test_db();
        let id = add_user(&db, "asha");
        db.update_profile(id, "Asha Devi", "Rampur", "111", Some("asha_profile_1_a.png"), None)
            .unwrap();
        let user = db.get_user_by_id(id).unwrap().unwrap();
        assert_eq!(user.fullname.as_deref(), Some("Asha Devi"));
        assert_eq!(user.profile_image.as_deref(), Some("asha_profile_1_a.png"));
        assert!(user.banner_image.is_none());
    }

    #[test]
    fn jobs_list_newest_first_with_category_filter() {
        let db = test_db();
        let uid = add_user(&db, "asha");
        add_job(&db, uid, "Field hand", "Agriculture");
        add_job(&db, uid, "Shop assistant", "Retail");
        add_job(&db, uid, "Harvest help", "Agriculture");

        let all = db.list_jobs(None).unwrap();
        assert_eq!(all.len(), 3);
        // Same-second inserts fall back to id order, newest first.
        assert_eq!(all[0].title, "Harvest help");
        assert_eq!(all[2].title, "Field hand");

        let farm = db.list_jobs(Some("Agriculture")).unwrap();
        assert_eq!(farm.len(), 2);
        assert!(farm.iter().all(|j| j.category.as_deref() == Some("Agriculture")));

        assert!(db.list_jobs(Some("Transport")).unwrap().is_empty());
    }

    #[test]
    fn product_search_is_substring_and_combines_with_category() {
        let db = test_db();
        let uid = add_user(&db, "asha");
        for (name, description, category) in [
            ("Basmati Rice", "aromatic grain", "Grains"),
            ("Rice flour", "finely milled", "Flour"),
            ("Clay pot", "holds rice well", "Kitchen"),
            ("Bicycle", "good condition", "Transport"),
        ] {
            db.insert_product(&NewProduct {
                name,
                description,
                price: "100",
                location: "",
                contact: "1",
                category,
                image: None,
                user_id: uid,
            })
            .unwrap();
        }

        // LIKE is ASCII case-insensitive: "rice" matches "Rice".
        let rice = db.list_products(None, Some("rice")).unwrap();
        assert_eq!(rice.len(), 3);

        let rice_grains = db.list_products(Some("Grains"), Some("rice")).unwrap();
        assert_eq!(rice_grains.len(), 1);
        assert_eq!(rice_grains[0].name, "Basmati Rice");

        let kitchen = db.list_products(Some("Kitchen"), None).unwrap();
        assert_eq!(kitchen.len(), 1);

        assert!(db.list_products(Some("Grains"), Some("bicycle")).unwrap().is_empty());
    }

    #[test]
    fn application_upsert_keeps_one_row_second_wins() {
        let db = test_db();
        let uid = add_user(&db, "asha");
        let job_id = add_job(&db, uid, "Field hand", "Agriculture");

        db.upsert_application(&NewApplication {
            job_id,
            user_id: uid,
            name: "Asha",
            phone: "111",
            experience: "none",
            message: "first",
        })
        .unwrap();
        db.upsert_application(&NewApplication {
            job_id,
            user_id: uid,
            name: "Asha Devi",
            phone: "222",
            experience: "two seasons",
            message: "second",
        })
        .unwrap();

        let count: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM job_applications WHERE user_id = ?1 AND job_id = ?2",
                    params![uid, job_id],
                    |r| r.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(count, 1);

        let app = db.get_application(uid, job_id).unwrap().unwrap();
        assert_eq!(app.name, "Asha Devi");
        assert_eq!(app.phone, "222");
        assert_eq!(app.message.as_deref(), Some("second"));
        // Status set on insert, untouched by resubmission.
        assert_eq!(app.status, "Pending");
    }

    #[test]
    fn applications_join_job_columns() {
        let db = test_db();
        let uid = add_user(&db, "asha");
        let job_id = add_job(&db, uid, "Field hand", "Agriculture");
        db.upsert_application(&NewApplication {
            job_id,
            user_id: uid,
            name: "Asha",
            phone: "111",
            experience: "",
            message: "",
        })
        .unwrap();

        let listed = db.list_applications_with_jobs(uid).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].job_title, "Field hand");
        assert_eq!(listed[0].job_category.as_deref(), Some("Agriculture"));
    }

    #[test]
    fn session_lifecycle_and_flashes() {
        let db = test_db();
        db.create_session("tok1", None, "en").unwrap();

        let session = db.get_session("tok1").unwrap().unwrap();
        assert!(session.user_id.is_none());
        assert_eq!(session.language, "en");

        db.push_flash("tok1", "first notice").unwrap();
        db.push_flash("tok1", "second notice").unwrap();
        let drained = db.take_flashes("tok1").unwrap();
        assert_eq!(drained, vec!["first notice", "second notice"]);
        // Draining clears the queue.
        assert!(db.take_flashes("tok1").unwrap().is_empty());

        db.set_session_language("tok1", "hi").unwrap();
        assert_eq!(db.get_session("tok1").unwrap().unwrap().language, "hi");

        db.delete_session("tok1").unwrap();
        assert!(db.get_session("tok1").unwrap().is_none());

        // Flash against a missing session is a no-op, not an error.
        db.push_flash("gone", "ignored").unwrap();
        assert!(db.take_flashes("gone").unwrap().is_empty());
    }

    #[test]
    fn authenticated_session_carries_user() {
        let db = test_db();
        let uid = add_user(&db, "asha");
        db.create_session("tok2", Some(uid), "en").unwrap();
        let session = db.get_session("tok2").unwrap().unwrap();
        assert_eq!(session.user_id, Some(uid));
    }
}
