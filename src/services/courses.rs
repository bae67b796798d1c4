// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course catalog client.

use crate::error::Result;
use crate::models::course::ListResponse;
use crate::models::{
    Course, CourseDetail, CourseList, CourseQuery, Enrollment, NewCourse, SearchFilters, Session,
};
use crate::services::api::{segment, ApiClient};
use reqwest::Method;
use serde::Serialize;

#[derive(Serialize)]
struct SearchParams<'a> {
    q: &'a str,
    #[serde(flatten)]
    filters: &'a SearchFilters,
}

/// Client for the `/courses/*` endpoints.
#[derive(Clone)]
pub struct CourseService {
    api: ApiClient,
}

impl CourseService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Paginated course list.
    pub async fn list(&self, query: &CourseQuery) -> Result<CourseList> {
        self.api
            .get_json_with_query("/courses/", query, None, "Failed to fetch courses")
            .await
    }

    pub async fn get(&self, id: &str) -> Result<CourseDetail> {
        self.api
            .get_json(
                &format!("/courses/{}/", segment(id)),
                None,
                "Failed to fetch course",
            )
            .await
    }

    pub async fn featured(&self) -> Result<Vec<Course>> {
        let courses: ListResponse<Course> = self
            .api
            .get_json("/courses/featured/", None, "Failed to fetch featured courses")
            .await?;
        Ok(courses.into_vec())
    }

    pub async fn popular(&self) -> Result<Vec<Course>> {
        let courses: ListResponse<Course> = self
            .api
            .get_json("/courses/popular/", None, "Failed to fetch popular courses")
            .await?;
        Ok(courses.into_vec())
    }

    /// Full-text search. Blank filters are not sent.
    pub async fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Course>> {
        let params = SearchParams { q: query, filters };
        let courses: ListResponse<Course> = self
            .api
            .get_json_with_query("/courses/search/", &params, None, "Failed to search courses")
            .await?;
        Ok(courses.into_vec())
    }

    pub async fn enroll(&self, session: &Session, course_id: &str) -> Result<Enrollment> {
        let token = session.access_token()?;
        let enrollment: Enrollment = self
            .api
            .send_json::<_, ()>(
                Method::POST,
                &format!("/courses/enroll/{}/", segment(course_id)),
                Some(token),
                None,
                "Failed to enroll in course",
            )
            .await?;

        tracing::info!(course_id, enrollment_id = %enrollment.id, "Enrolled in course");
        Ok(enrollment)
    }

    pub async fn enrollments(&self, session: &Session) -> Result<Vec<Enrollment>> {
        let enrollments: ListResponse<Enrollment> = self
            .api
            .get_json(
                "/courses/enrollments/",
                Some(session.access_token()?),
                "Failed to fetch enrollments",
            )
            .await?;
        Ok(enrollments.into_vec())
    }

    pub async fn instructor_courses(&self, session: &Session) -> Result<Vec<Course>> {
        let courses: ListResponse<Course> = self
            .api
            .get_json(
                "/courses/instructor/courses/",
                Some(session.access_token()?),
                "Failed to fetch instructor courses",
            )
            .await?;
        Ok(courses.into_vec())
    }

    pub async fn create_course(&self, session: &Session, course: &NewCourse) -> Result<Course> {
        let mut created: Course = self
            .api
            .send_json(
                Method::POST,
                "/courses/instructor/courses/",
                Some(session.access_token()?),
                Some(course),
                "Failed to create course",
            )
            .await?;

        // The create response carries the instructor's id, not a name.
        if created.instructor_name.is_empty() {
            if let Some(user) = &session.user {
                created.instructor_name = user.display_name();
            }
        }

        tracing::info!(course_id = %created.id, title = %created.title, "Course created");
        Ok(created)
    }
}
