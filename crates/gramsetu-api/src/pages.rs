//! Minimal server-rendered pages. No template engine: the view layer only
//! exists to carry the behavioral contract — notices, forms, listings —
//! with all user content escaped.

use axum::response::Html;
use chrono::NaiveDateTime;

use gramsetu_db::models::{
    ApplicationWithJob, IssueRow, JobRow, ProductRow, SchemeRow, UserRow,
};

use crate::middleware::RequestContext;

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn opt(value: &Option<String>) -> String {
    escape(value.as_deref().unwrap_or(""))
}

pub fn render(ctx: &RequestContext, notices: &[String], title: &str, body: &str) -> Html<String> {
    let nav_user = match &ctx.user {
        Some(user) => format!(
            r#"<a href="/profile">{}</a> <a href="/my-applications">My Applications</a> <a href="/settings">Settings</a> <a href="/logout">Logout</a>"#,
            escape(&user.fullname)
        ),
        None => r#"<a href="/login">Login</a> <a href="/register">Register</a>"#.to_string(),
    };

    let notice_block = if notices.is_empty() {
        String::new()
    } else {
        let items: String = notices
            .iter()
            .map(|n| format!("<li>{}</li>", escape(n)))
            .collect();
        format!(r#"<ul class="notices">{}</ul>"#, items)
    };

    Html(format!(
        r#"<!doctype html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - GramSetu</title>
</head>
<body>
<nav>
<a href="/">GramSetu</a>
<a href="/jobs">Jobs</a>
<a href="/schemes">Schemes</a>
<a href="/issues">Issues</a>
<a href="/marketplace">Marketplace</a>
{nav_user}
<a href="/language/en?next=/">EN</a>
<a href="/language/hi?next=/">हिंदी</a>
</nav>
{notice_block}
<main>
{body}
</main>
</body>
</html>"#,
        lang = escape(&ctx.language),
        title = escape(title),
        nav_user = nav_user,
        notice_block = notice_block,
        body = body,
    ))
}

pub fn landing_body() -> String {
    r#"<h1>Welcome to GramSetu</h1>
<p>Your village community portal: find work, government schemes, report
local issues, and trade in the marketplace.</p>
<ul>
<li><a href="/jobs">Job Board</a></li>
<li><a href="/schemes">Government Schemes</a></li>
<li><a href="/issues">Infrastructure Issues</a></li>
<li><a href="/marketplace">Marketplace</a></li>
</ul>"#
        .to_string()
}

// -- Jobs --

pub fn jobs_body(jobs: &[JobRow], selected_category: Option<&str>) -> String {
    let filter = format!(
        r#"<form method="get" action="/jobs">
<input type="text" name="category" placeholder="Category" value="{}">
<button type="submit">Filter</button>
</form>"#,
        escape(selected_category.unwrap_or(""))
    );

    let items: String = jobs
        .iter()
        .map(|job| {
            format!(
                r#"<li><a href="/jobs/{id}">{title}</a> — {category} — {location} — posted {posted}</li>"#,
                id = job.id,
                title = escape(&job.title),
                category = opt(&job.category),
                location = opt(&job.location),
                posted = escape(&job.posted_date),
            )
        })
        .collect();

    format!(
        r#"<h1>Job Board</h1>
<p><a href="/jobs/new">Post a job</a></p>
{filter}
<ul class="jobs">{items}</ul>"#
    )
}

pub fn job_detail_body(job: &JobRow, posted: NaiveDateTime) -> String {
    format!(
        r#"<h1>{title}</h1>
<p>{description}</p>
<dl>
<dt>Location</dt><dd>{location}</dd>
<dt>Category</dt><dd>{category}</dd>
<dt>Eligibility</dt><dd>{eligibility}</dd>
<dt>Salary</dt><dd>{salary}</dd>
<dt>Deadline</dt><dd>{deadline}</dd>
<dt>Contact</dt><dd>{contact}</dd>
<dt>Posted</dt><dd>{posted}</dd>
</dl>
<p><a href="/jobs/{id}/apply">Apply for this job</a></p>
<p><a href="/jobs">Back to all jobs</a></p>"#,
        title = escape(&job.title),
        description = escape(&job.description),
        location = opt(&job.location),
        category = opt(&job.category),
        eligibility = opt(&job.eligibility),
        salary = opt(&job.salary),
        deadline = opt(&job.deadline),
        contact = escape(&job.contact),
        posted = posted.format("%d %B %Y, %H:%M"),
        id = job.id,
    )
}

pub fn new_job_body() -> String {
    r#"<h1>Post a Job</h1>
<form method="post" action="/jobs/new">
<label>Title <input type="text" name="title"></label>
<label>Description <textarea name="description"></textarea></label>
<label>Location <input type="text" name="location"></label>
<label>Contact <input type="text" name="contact"></label>
<label>Category <input type="text" name="category"></label>
<label>Eligibility <input type="text" name="eligibility"></label>
<label>Salary <input type="text" name="salary"></label>
<label>Deadline <input type="text" name="deadline"></label>
<button type="submit">Post Job</button>
</form>"#
        .to_string()
}

pub fn apply_body(job: &JobRow, already_applied: bool, prefill_name: &str) -> String {
    let heading = if already_applied {
        "<p>You have already applied. Submitting again updates your application.</p>"
    } else {
        ""
    };
    format!(
        r#"<h1>Apply: {title}</h1>
{heading}
<form method="post" action="/jobs/{id}/apply">
<label>Name <input type="text" name="name" value="{name}"></label>
<label>Phone <input type="text" name="phone"></label>
<label>Experience <textarea name="experience"></textarea></label>
<label>Message <textarea name="message"></textarea></label>
<button type="submit">Submit Application</button>
</form>
<p><a href="/jobs/{id}">Back to job</a></p>"#,
        title = escape(&job.title),
        heading = heading,
        id = job.id,
        name = escape(prefill_name),
    )
}

pub fn my_applications_body(applications: &[ApplicationWithJob]) -> String {
    let items: String = applications
        .iter()
        .map(|entry| {
            format!(
                r#"<li><a href="/jobs/{job_id}">{job_title}</a> — {category} — {location} — deadline {deadline} — applied {applied} — status {status}</li>"#,
                job_id = entry.application.job_id,
                job_title = escape(&entry.job_title),
                category = opt(&entry.job_category),
                location = opt(&entry.job_location),
                deadline = opt(&entry.job_deadline),
                applied = escape(&entry.application.application_date),
                status = escape(&entry.application.status),
            )
        })
        .collect();
    format!(
        r#"<h1>My Applications</h1>
<ul class="applications">{items}</ul>"#
    )
}

// -- Schemes --

pub fn schemes_body(schemes: &[SchemeRow]) -> String {
    let items: String = schemes
        .iter()
        .map(|scheme| {
            format!(
                r#"<li><a href="/schemes/{id}">{title}</a> — {agency}</li>"#,
                id = scheme.id,
                title = escape(&scheme.title),
                agency = opt(&scheme.agency),
            )
        })
        .collect();
    format!(
        r#"<h1>Government Schemes</h1>
<ul class="schemes">{items}</ul>"#
    )
}

pub fn scheme_detail_body(scheme: &SchemeRow) -> String {
    format!(
        r#"<h1>{title}</h1>
<p>{description}</p>
<dl>
<dt>Eligibility</dt><dd>{eligibility}</dd>
<dt>How to apply</dt><dd>{how_to_apply}</dd>
<dt>Deadline</dt><dd>{deadline}</dd>
<dt>Agency</dt><dd>{agency}</dd>
<dt>Contact</dt><dd>{contact}</dd>
<dt>Website</dt><dd>{website}</dd>
</dl>
<p><a href="/schemes">Back to all schemes</a></p>"#,
        title = escape(&scheme.title),
        description = escape(&scheme.description),
        eligibility = opt(&scheme.eligibility),
        how_to_apply = opt(&scheme.how_to_apply),
        deadline = opt(&scheme.deadline),
        agency = opt(&scheme.agency),
        contact = opt(&scheme.contact),
        website = opt(&scheme.website),
    )
}

// -- Issues --

pub fn issues_body(issues: &[IssueRow]) -> String {
    let items: String = issues
        .iter()
        .map(|issue| {
            let image = match &issue.image {
                Some(name) => format!(r#" <img src="/uploads/{}" alt="issue photo">"#, escape(name)),
                None => String::new(),
            };
            format!(
                r#"<li>{title} — {location} — {category} — reported {reported} — status {status}{image}</li>"#,
                title = escape(&issue.title),
                location = escape(&issue.location),
                category = opt(&issue.category),
                reported = escape(&issue.reported_date),
                status = escape(&issue.status),
                image = image,
            )
        })
        .collect();
    format!(
        r#"<h1>Infrastructure Issues</h1>
<p><a href="/issues/report">Report an issue</a></p>
<ul class="issues">{items}</ul>"#
    )
}

pub fn report_issue_body() -> String {
    r#"<h1>Report an Issue</h1>
<form method="post" action="/issues/report" enctype="multipart/form-data">
<label>Title <input type="text" name="title"></label>
<label>Description <textarea name="description"></textarea></label>
<label>Location <input type="text" name="location"></label>
<label>Category <input type="text" name="category"></label>
<label>Photo <input type="file" name="image" accept=".jpg,.jpeg,.png,.gif"></label>
<button type="submit">Report Issue</button>
</form>"#
        .to_string()
}

// -- Marketplace --

pub fn market_body(
    products: &[ProductRow],
    category: Option<&str>,
    search: Option<&str>,
) -> String {
    let filter = format!(
        r#"<form method="get" action="/marketplace">
<input type="text" name="category" placeholder="Category" value="{category}">
<input type="text" name="search" placeholder="Search" value="{search}">
<button type="submit">Filter</button>
</form>"#,
        category = escape(category.unwrap_or("")),
        search = escape(search.unwrap_or("")),
    );

    let items: String = products
        .iter()
        .map(|product| {
            let image = match &product.image {
                Some(name) => {
                    format!(r#" <img src="/uploads/{}" alt="product photo">"#, escape(name))
                }
                None => String::new(),
            };
            format!(
                r#"<li>{name} — Rs. {price} — {category} — {location} — contact {contact}{image}</li>"#,
                name = escape(&product.name),
                price = escape(&product.price),
                category = opt(&product.category),
                location = opt(&product.location),
                contact = escape(&product.contact),
                image = image,
            )
        })
        .collect();

    format!(
        r#"<h1>Marketplace</h1>
<p><a href="/marketplace/new">List a product</a></p>
{filter}
<ul class="products">{items}</ul>"#
    )
}

pub fn new_product_body() -> String {
    r#"<h1>List a Product</h1>
<form method="post" action="/marketplace/new" enctype="multipart/form-data">
<label>Name <input type="text" name="name"></label>
<label>Description <textarea name="description"></textarea></label>
<label>Price <input type="text" name="price"></label>
<label>Location <input type="text" name="location"></label>
<label>Contact <input type="text" name="contact"></label>
<label>Category <input type="text" name="category"></label>
<label>Photo <input type="file" name="image" accept=".jpg,.jpeg,.png,.gif"></label>
<button type="submit">List Product</button>
</form>"#
        .to_string()
}

// -- Auth --

pub fn register_body() -> String {
    r#"<h1>Register</h1>
<form method="post" action="/register">
<label>Username <input type="text" name="username"></label>
<label>Password <input type="password" name="password"></label>
<label>Full name <input type="text" name="fullname"></label>
<label>Village <input type="text" name="village"></label>
<label>Contact <input type="text" name="contact"></label>
<button type="submit">Register</button>
</form>
<p>Already have an account? <a href="/login">Login</a></p>"#
        .to_string()
}

pub fn login_body() -> String {
    r#"<h1>Login</h1>
<form method="post" action="/login">
<label>Username <input type="text" name="username"></label>
<label>Password <input type="password" name="password"></label>
<button type="submit">Login</button>
</form>
<p>New here? <a href="/register">Register</a></p>"#
        .to_string()
}

// -- Profile --

pub fn profile_body(
    user: &UserRow,
    jobs: &[JobRow],
    issues: &[IssueRow],
    products: &[ProductRow],
    applications: &[ApplicationWithJob],
) -> String {
    let banner = match &user.banner_image {
        Some(name) => format!(r#"<img src="/uploads/{}" alt="banner">"#, escape(name)),
        None => String::new(),
    };
    let portrait = match &user.profile_image {
        Some(name) => format!(r#"<img src="/uploads/{}" alt="profile photo">"#, escape(name)),
        None => String::new(),
    };

    let job_items: String = jobs
        .iter()
        .map(|j| format!(r#"<li><a href="/jobs/{}">{}</a></li>"#, j.id, escape(&j.title)))
        .collect();
    let issue_items: String = issues
        .iter()
        .map(|i| format!("<li>{} — {}</li>", escape(&i.title), escape(&i.status)))
        .collect();
    let product_items: String = products
        .iter()
        .map(|p| format!("<li>{} — Rs. {}</li>", escape(&p.name), escape(&p.price)))
        .collect();
    let application_items: String = applications
        .iter()
        .map(|a| {
            format!(
                "<li>{} — {}</li>",
                escape(&a.job_title),
                escape(&a.application.status)
            )
        })
        .collect();

    format!(
        r#"{banner}
<h1>{fullname}</h1>
{portrait}
<dl>
<dt>Username</dt><dd>{username}</dd>
<dt>Village</dt><dd>{village}</dd>
<dt>Contact</dt><dd>{contact}</dd>
<dt>Joined</dt><dd>{joined}</dd>
</dl>
<p><a href="/edit_profile">Edit profile</a></p>
<h2>My Jobs</h2><ul>{job_items}</ul>
<h2>My Issues</h2><ul>{issue_items}</ul>
<h2>My Products</h2><ul>{product_items}</ul>
<h2>My Applications</h2><ul>{application_items}</ul>"#,
        banner = banner,
        fullname = opt(&user.fullname),
        portrait = portrait,
        username = escape(&user.username),
        village = opt(&user.village),
        contact = escape(&user.contact),
        joined = escape(&user.joined_date),
        job_items = job_items,
        issue_items = issue_items,
        product_items = product_items,
        application_items = application_items,
    )
}

pub fn edit_profile_body(user: &UserRow) -> String {
    format!(
        r#"<h1>Edit Profile</h1>
<form method="post" action="/edit_profile" enctype="multipart/form-data">
<label>Full name <input type="text" name="fullname" value="{fullname}"></label>
<label>Village <input type="text" name="village" value="{village}"></label>
<label>Contact <input type="text" name="contact" value="{contact}"></label>
<label>Profile photo <input type="file" name="profile_image" accept=".jpg,.jpeg,.png,.gif"></label>
<label>Banner image <input type="file" name="banner_image" accept=".jpg,.jpeg,.png,.gif"></label>
<button type="submit">Save</button>
</form>
<p><a href="/profile">Back to profile</a></p>"#,
        fullname = opt(&user.fullname),
        village = opt(&user.village),
        contact = escape(&user.contact),
    )
}

pub fn settings_body(user: &UserRow) -> String {
    format!(
        r#"<h1>Settings</h1>
<dl>
<dt>Username</dt><dd>{username}</dd>
<dt>Contact</dt><dd>{contact}</dd>
<dt>Joined</dt><dd>{joined}</dd>
</dl>
<p><a href="/edit_profile">Edit profile</a> · <a href="/direct-upload">Direct photo upload</a></p>"#,
        username = escape(&user.username),
        contact = escape(&user.contact),
        joined = escape(&user.joined_date),
    )
}

pub fn direct_upload_body() -> String {
    r#"<h1>Upload Profile Picture</h1>
<form method="post" action="/direct-upload" enctype="multipart/form-data">
<label>Select image <input type="file" name="file" accept=".jpg,.jpeg,.png,.gif"></label>
<button type="submit">Upload</button>
</form>
<p><a href="/profile">Return to profile</a></p>"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x&y")</script>"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape("plain text"), "plain text");
    }
}
