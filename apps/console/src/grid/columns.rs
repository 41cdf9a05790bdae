//! Column catalogue: the only per-shape knowledge the grid engine needs.
//! Each record kind lists its visible columns with an explicit `FieldKind`,
//! plus the field paths its structured filters apply to.

use serde::Serialize;

use crate::grid::comparator::FieldKind;
use crate::models::RecordKind;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub key: &'static str,
    #[serde(skip)]
    pub path: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

const fn column(key: &'static str, path: &'static str, label: &'static str, kind: FieldKind) -> Column {
    Column {
        key,
        path,
        label,
        kind,
    }
}

#[derive(Debug)]
pub struct Catalogue {
    pub columns: &'static [Column],
    pub company: Option<&'static str>,
    pub platform: Option<&'static str>,
    pub assignee: Option<&'static str>,
    /// Field the `from`/`to` range applies to.
    pub date_field: &'static str,
    /// Default ordering: reverse-chronological on this column.
    pub default_sort: &'static str,
}

impl Catalogue {
    pub fn column(&self, key: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn search_paths(&self) -> impl Iterator<Item = &'static str> {
        self.columns.iter().map(|c| c.path)
    }
}

const LEAD_COLUMNS: &[Column] = &[
    column("name", "name", "Name", FieldKind::String),
    column("email", "email", "Email", FieldKind::String),
    column("phone", "phone", "Phone", FieldKind::String),
    column("company", "company", "Company", FieldKind::String),
    column("course", "course.courseName", "Course", FieldKind::String),
    column("source", "source", "Source", FieldKind::String),
    column("assignedTo", "assignedTo", "Assigned To", FieldKind::String),
    column("createdAt", "createdAt", "Created", FieldKind::Date),
    column("updatedAt", "updatedAt", "Updated", FieldKind::Date),
];

const ENROLLMENT_COLUMNS: &[Column] = &[
    column("studentName", "studentName", "Student", FieldKind::String),
    column("email", "email", "Email", FieldKind::String),
    column("phone", "phone", "Phone", FieldKind::String),
    column("company", "company", "Company", FieldKind::String),
    column("course", "course.courseName", "Course", FieldKind::String),
    column("amount", "amount", "Amount", FieldKind::Number),
    column("paymentStatus", "paymentStatus", "Payment", FieldKind::String),
    column("assignedTo", "assignedTo", "Assigned To", FieldKind::String),
    column("createdAt", "createdAt", "Created", FieldKind::Date),
    column("updatedAt", "updatedAt", "Updated", FieldKind::Date),
];

const INTERN_APPLICATION_COLUMNS: &[Column] = &[
    column("fullName", "fullName", "Name", FieldKind::String),
    column("email", "email", "Email", FieldKind::String),
    column("phone", "phone", "Phone", FieldKind::String),
    column("position", "position", "Position", FieldKind::String),
    column("college", "college", "College", FieldKind::String),
    column("experience", "experience", "Experience (yrs)", FieldKind::Number),
    column("createdAt", "createdAt", "Applied", FieldKind::Date),
];

const SOCIAL_POST_COLUMNS: &[Column] = &[
    column("title", "title", "Title", FieldKind::String),
    column("platform", "platform", "Platform", FieldKind::String),
    column("company", "company", "Company", FieldKind::String),
    column("caption", "caption", "Caption", FieldKind::String),
    column("likes", "likes", "Likes", FieldKind::Number),
    column("comments", "comments", "Comments", FieldKind::Number),
    column("postedAt", "postedAt", "Posted", FieldKind::Date),
    column("createdAt", "createdAt", "Created", FieldKind::Date),
];

static LEADS: Catalogue = Catalogue {
    columns: LEAD_COLUMNS,
    company: Some("company"),
    platform: None,
    assignee: Some("assignedTo"),
    date_field: "createdAt",
    default_sort: "createdAt",
};

static ENROLLMENTS: Catalogue = Catalogue {
    columns: ENROLLMENT_COLUMNS,
    company: Some("company"),
    platform: None,
    assignee: Some("assignedTo"),
    date_field: "createdAt",
    default_sort: "createdAt",
};

static INTERN_APPLICATIONS: Catalogue = Catalogue {
    columns: INTERN_APPLICATION_COLUMNS,
    company: None,
    platform: None,
    assignee: None,
    date_field: "createdAt",
    default_sort: "createdAt",
};

static SOCIAL_POSTS: Catalogue = Catalogue {
    columns: SOCIAL_POST_COLUMNS,
    company: Some("company"),
    platform: Some("platform"),
    assignee: None,
    date_field: "postedAt",
    default_sort: "createdAt",
};

pub fn catalogue(kind: RecordKind) -> &'static Catalogue {
    match kind {
        RecordKind::Lead => &LEADS,
        RecordKind::Enrollment => &ENROLLMENTS,
        RecordKind::InternApplication => &INTERN_APPLICATIONS,
        RecordKind::SocialPost => &SOCIAL_POSTS,
    }
}
