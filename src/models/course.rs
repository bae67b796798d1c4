// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course catalog models and client-side filtering.

use super::decimal;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Course summary as listed by the catalog endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    /// Absent from the create-course response, which only carries ids
    #[serde(default)]
    pub instructor_name: String,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Base price (USD-equivalent)
    #[serde(deserialize_with = "decimal::deserialize")]
    pub price: f64,
    #[serde(default, deserialize_with = "decimal::option")]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub difficulty_level: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub is_bestseller: bool,
    #[serde(default)]
    pub is_featured: bool,
    /// Minutes
    #[serde(default)]
    pub total_duration: u32,
    #[serde(default)]
    pub total_lectures: u32,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_students: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Course {
    /// Whole-percent discount against the original price, if any.
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.original_price?;
        if original <= 0.0 || self.price >= original {
            return None;
        }
        Some(((1.0 - self.price / original) * 100.0).round() as u32)
    }
}

/// Course category as nested in the detail payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub course_count: u32,
}

/// Full course page payload.
///
/// Upstream sends the model's own fields here: `instructor` as a display
/// string and `category` as an object, not the list endpoints' `*_name`
/// columns. Decoding fills in [`Course`] from those.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "CourseDetailPayload")]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub category: Option<Category>,
    pub sections: Vec<Section>,
    pub reviews_count: u32,
    pub requirements: Vec<String>,
    pub what_you_will_learn: Vec<String>,
    pub target_audience: Vec<String>,
}

#[derive(Deserialize)]
struct CourseDetailPayload {
    id: String,
    title: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    instructor: Option<String>,
    #[serde(default)]
    category: Option<Category>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    price: f64,
    #[serde(default, deserialize_with = "decimal::option")]
    original_price: Option<f64>,
    #[serde(default)]
    is_free: bool,
    #[serde(default)]
    difficulty_level: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    is_bestseller: bool,
    #[serde(default)]
    is_featured: bool,
    #[serde(default)]
    total_duration: u32,
    #[serde(default)]
    total_lectures: u32,
    #[serde(default)]
    average_rating: f64,
    #[serde(default)]
    total_students: u64,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    updated_at: String,
    #[serde(default)]
    sections: Vec<Section>,
    #[serde(default)]
    reviews_count: u32,
    #[serde(default)]
    requirements: Vec<String>,
    #[serde(default)]
    what_you_will_learn: Vec<String>,
    #[serde(default)]
    target_audience: Vec<String>,
}

/// Display name from a user's string form, `"Full Name (email)"`.
/// Falls back to the email when the full name is blank.
fn instructor_display_name(raw: &str) -> String {
    let raw = raw.trim();
    match raw.strip_suffix(')').and_then(|rest| rest.rsplit_once('(')) {
        Some((name, email)) if email.contains('@') => {
            let name = name.trim();
            if name.is_empty() {
                email.to_string()
            } else {
                name.to_string()
            }
        }
        _ => raw.to_string(),
    }
}

impl From<CourseDetailPayload> for CourseDetail {
    fn from(p: CourseDetailPayload) -> Self {
        let course = Course {
            id: p.id,
            title: p.title,
            subtitle: p.subtitle,
            description: p.description,
            instructor_name: p
                .instructor
                .as_deref()
                .map(instructor_display_name)
                .unwrap_or_default(),
            category_name: p
                .category
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            thumbnail: p.thumbnail,
            price: p.price,
            original_price: p.original_price,
            is_free: p.is_free,
            difficulty_level: p.difficulty_level,
            language: p.language,
            is_bestseller: p.is_bestseller,
            is_featured: p.is_featured,
            total_duration: p.total_duration,
            total_lectures: p.total_lectures,
            average_rating: p.average_rating,
            total_students: p.total_students,
            created_at: p.created_at,
            updated_at: p.updated_at,
        };

        CourseDetail {
            course,
            category: p.category,
            sections: p.sections,
            reviews_count: p.reviews_count,
            requirements: p.requirements,
            what_you_will_learn: p.what_you_will_learn,
            target_audience: p.target_audience,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lectures: Vec<Lecture>,
    #[serde(default)]
    pub lecture_count: u32,
    #[serde(default)]
    pub total_duration: u32,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecture {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lecture_type: String,
    #[serde(default)]
    pub video_duration: u32,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub is_preview: bool,
    #[serde(default)]
    pub is_free: bool,
}

/// A student's enrollment in a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: String,
    pub course: Course,
    pub enrolled_at: String,
    #[serde(default)]
    pub progress_percentage: f64,
    #[serde(default)]
    pub completed: bool,
    /// Minutes
    #[serde(default)]
    pub time_spent: u64,
    #[serde(default)]
    pub last_accessed: Option<String>,
}

/// Paginated `GET /courses/` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseList {
    pub results: Vec<Course>,
    pub count: u64,
}

/// List endpoints answer either `[...]` or `{"results": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paginated { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Paginated { results } => results,
            ListResponse::Plain(items) => items,
        }
    }
}

/// Query parameters for `GET /courses/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_free: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
}

/// Filters for `GET /courses/search/`. Empty values are not sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "is_blank")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub price_range: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

/// Instructor's new-course form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub is_free: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Category filter choices on the storefront.
pub const CATEGORIES: &[&str] = &[
    "Web Development",
    "Data Science",
    "Design",
    "Marketing",
    "Business",
    "Photography",
];

/// Difficulty filter choices on the storefront.
pub const LEVELS: &[&str] = &["Beginner", "Intermediate", "Advanced", "All Levels"];

/// Price band on the course list page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBand {
    #[default]
    All,
    Free,
    Paid,
    Under50,
    Under100,
}

impl PriceBand {
    pub fn matches(self, price: f64) -> bool {
        match self {
            PriceBand::All => true,
            PriceBand::Free => price == 0.0,
            PriceBand::Paid => price > 0.0,
            PriceBand::Under50 => price < 50.0,
            PriceBand::Under100 => price < 100.0,
        }
    }
}

/// Filters applied to the course list page. `None` means "all".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub price: PriceBand,
}

impl CourseFilter {
    pub fn matches(&self, course: &Course) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                course.title.to_lowercase().contains(&query)
                    || course.instructor_name.to_lowercase().contains(&query)
            }
        };
        let category_ok = match self.category.as_deref() {
            None | Some("all") => true,
            Some(category) => course.category_name == category,
        };
        let level_ok = match self.level.as_deref() {
            None | Some("all") => true,
            Some(level) => course.difficulty_level.contains(level),
        };

        search_ok && category_ok && level_ok && self.price.matches(course.price)
    }

    pub fn apply<'a>(&self, courses: &'a [Course]) -> Vec<&'a Course> {
        courses.iter().filter(|c| self.matches(c)).collect()
    }
}

#[cfg(test)]
pub(crate) fn sample_course(id: &str, title: &str, price: f64) -> Course {
    Course {
        id: id.to_string(),
        title: title.to_string(),
        subtitle: String::new(),
        description: String::new(),
        instructor_name: "Sarah Johnson".to_string(),
        category_name: "Web Development".to_string(),
        thumbnail: None,
        price,
        original_price: Some(199.99),
        is_free: price == 0.0,
        difficulty_level: "Beginner to Advanced".to_string(),
        language: "English".to_string(),
        is_bestseller: false,
        is_featured: false,
        total_duration: 2520,
        total_lectures: 45,
        average_rating: 4.8,
        total_students: 12_543,
        created_at: String::new(),
        updated_at: String::new(),
    }
}
