// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page view models: everything a storefront page renders, in one response.

use crate::currency::{format_in, Currency};
use crate::error::Result;
use crate::middleware::auth::CurrentSession;
use crate::models::course::{CATEGORIES, LEVELS};
use crate::models::{
    Course, CourseDetail, CourseFilter, CourseQuery, Enrollment, InstructorStats, PriceBand,
    SearchFilters, StudentStats, Transaction, User,
};
use crate::payment_methods::{available_payment_methods, PaymentMethodView};
use crate::routes::api::require_instructor;
use crate::routes::{display_currency, visitor_country};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pages/home", get(home))
        .route("/pages/courses", get(courses))
        .route("/pages/courses/{id}", get(course_detail))
        .route("/pages/search", get(search))
}

/// Dashboards (require a session).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pages/dashboard", get(student_dashboard))
        .route("/pages/instructor", get(instructor_dashboard))
}

/// A course with its prices formatted for display.
#[derive(Debug, Serialize)]
pub struct CourseCard {
    #[serde(flatten)]
    pub course: Course,
    pub display_price: String,
    pub display_original_price: Option<String>,
    pub discount_percent: Option<u32>,
}

impl CourseCard {
    pub fn new(course: Course, currency: Currency) -> Self {
        Self {
            display_price: format_in(course.price, currency),
            display_original_price: course.original_price.map(|p| format_in(p, currency)),
            discount_percent: course.discount_percent(),
            course,
        }
    }
}

fn cards(courses: Vec<Course>, currency: Currency) -> Vec<CourseCard> {
    courses
        .into_iter()
        .map(|course| CourseCard::new(course, currency))
        .collect()
}

#[derive(Deserialize)]
struct CurrencyQuery {
    currency: Option<String>,
}

// ─── Home ────────────────────────────────────────────────────

#[derive(Serialize)]
struct HomePage {
    currency: Currency,
    featured: Vec<CourseCard>,
    popular: Vec<CourseCard>,
    categories: &'static [&'static str],
}

/// Landing page. A failed section renders empty rather than failing the page.
async fn home(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CurrencyQuery>,
) -> Result<Json<HomePage>> {
    let currency = display_currency(&headers, query.currency.as_deref())?;

    let (featured, popular) = tokio::join!(state.courses.featured(), state.courses.popular());
    let featured = featured.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load featured courses");
        Vec::new()
    });
    let popular = popular.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load popular courses");
        Vec::new()
    });

    Ok(Json(HomePage {
        currency,
        featured: cards(featured, currency),
        popular: cards(popular, currency),
        categories: CATEGORIES,
    }))
}

// ─── Course list ─────────────────────────────────────────────

#[derive(Deserialize)]
struct CoursesQuery {
    search: Option<String>,
    category: Option<String>,
    level: Option<String>,
    #[serde(default)]
    price: PriceBand,
    currency: Option<String>,
}

#[derive(Serialize)]
struct CoursesPage {
    currency: Currency,
    courses: Vec<CourseCard>,
    showing: usize,
    total: usize,
    summary: String,
    categories: &'static [&'static str],
    levels: &'static [&'static str],
}

async fn courses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CoursesQuery>,
) -> Result<Json<CoursesPage>> {
    let currency = display_currency(&headers, query.currency.as_deref())?;
    let filter = CourseFilter {
        search: query.search,
        category: query.category,
        level: query.level,
        price: query.price,
    };

    let list = state.courses.list(&CourseQuery::default()).await?;
    let total = list.results.len();
    let matching: Vec<Course> = filter.apply(&list.results).into_iter().cloned().collect();
    let showing = matching.len();

    Ok(Json(CoursesPage {
        currency,
        courses: cards(matching, currency),
        showing,
        total,
        summary: format!("Showing {} of {} courses", showing, total),
        categories: CATEGORIES,
        levels: LEVELS,
    }))
}

// ─── Course detail ───────────────────────────────────────────

#[derive(Deserialize)]
struct DetailQuery {
    currency: Option<String>,
    country: Option<String>,
}

#[derive(Serialize)]
struct CourseDetailPage {
    currency: Currency,
    course: CourseDetail,
    display_price: String,
    display_original_price: Option<String>,
    discount_percent: Option<u32>,
    country: String,
    payment_methods: Vec<PaymentMethodView>,
}

async fn course_detail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<Json<CourseDetailPage>> {
    let currency = display_currency(&headers, query.currency.as_deref())?;
    let country = visitor_country(
        &headers,
        query.country.as_deref(),
        &state.config.default_country,
    );

    let detail = state.courses.get(&id).await?;
    let course = &detail.course;
    let payment_methods = available_payment_methods(&country)
        .into_iter()
        .map(PaymentMethodView::from)
        .collect();

    Ok(Json(CourseDetailPage {
        currency,
        display_price: format_in(course.price, currency),
        display_original_price: course.original_price.map(|p| format_in(p, currency)),
        discount_percent: course.discount_percent(),
        country,
        payment_methods,
        course: detail,
    }))
}

// ─── Search ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    #[serde(flatten)]
    filters: SearchFilters,
    currency: Option<String>,
}

#[derive(Serialize)]
struct SearchPage {
    currency: Currency,
    query: String,
    results: Vec<CourseCard>,
    total: usize,
}

/// Search results. A blank query returns nothing without asking upstream.
async fn search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchPage>> {
    let currency = display_currency(&headers, query.currency.as_deref())?;
    let q = query.q.trim().to_string();

    let results = if q.is_empty() {
        Vec::new()
    } else {
        state.courses.search(&q, &query.filters).await?
    };

    Ok(Json(SearchPage {
        currency,
        total: results.len(),
        results: cards(results, currency),
        query: q,
    }))
}

// ─── Dashboards ──────────────────────────────────────────────

#[derive(Serialize)]
struct StudentDashboard {
    display_name: Option<String>,
    user: Option<User>,
    stats: StudentStats,
    enrollments: Vec<Enrollment>,
    transactions: Vec<Transaction>,
}

async fn student_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<StudentDashboard>> {
    let payments = state
        .mobile_payments
        .for_session(&state.sessions, &current.id);
    let (enrollments, transactions) = tokio::join!(
        state.courses.enrollments(&current.session),
        payments.transactions()
    );
    let enrollments = enrollments?;
    // Payment history is secondary; show the dashboard without it.
    let transactions = match transactions {
        Ok(transactions) => transactions,
        Err(e) if e.is_auth_error() => return Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load payment history");
            Vec::new()
        }
    };

    Ok(Json(StudentDashboard {
        display_name: current.session.user.as_ref().map(User::display_name),
        user: current.session.user.clone(),
        stats: StudentStats::from_enrollments(&enrollments),
        enrollments,
        transactions,
    }))
}

#[derive(Serialize)]
struct InstructorDashboard {
    currency: Currency,
    stats: InstructorStats,
    display_revenue: String,
    courses: Vec<CourseCard>,
}

async fn instructor_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    headers: HeaderMap,
    Query(query): Query<CurrencyQuery>,
) -> Result<Json<InstructorDashboard>> {
    require_instructor(&current)?;
    let currency = display_currency(&headers, query.currency.as_deref())?;

    let courses = state.courses.instructor_courses(&current.session).await?;
    let stats = InstructorStats::from_courses(&courses);

    Ok(Json(InstructorDashboard {
        currency,
        display_revenue: format_in(stats.total_revenue, currency),
        stats,
        courses: cards(courses, currency),
    }))
}
