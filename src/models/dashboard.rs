//! Dashboard aggregates computed from upstream lists.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Course, Enrollment};

/// Learning statistics for the student dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StudentStats {
    pub enrolled: u32,
    pub completed: u32,
    pub in_progress: u32,
    /// Mean progress across enrollments, whole percent
    pub average_progress: u32,
    /// Total time spent, hours (one decimal)
    pub hours_spent: f64,
}

impl StudentStats {
    pub fn from_enrollments(enrollments: &[Enrollment]) -> Self {
        if enrollments.is_empty() {
            return Self::default();
        }

        let completed = enrollments.iter().filter(|e| e.completed).count() as u32;
        let in_progress = enrollments
            .iter()
            .filter(|e| !e.completed && e.progress_percentage > 0.0)
            .count() as u32;
        let progress_sum: f64 = enrollments
            .iter()
            .map(|e| e.progress_percentage.clamp(0.0, 100.0))
            .sum();
        let minutes: u64 = enrollments.iter().map(|e| e.time_spent).sum();

        Self {
            enrolled: enrollments.len() as u32,
            completed,
            in_progress,
            average_progress: (progress_sum / enrollments.len() as f64).round() as u32,
            hours_spent: (minutes as f64 / 6.0).round() / 10.0,
        }
    }
}

/// Teaching statistics for the instructor dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct InstructorStats {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_students: u64,
    /// Gross revenue in base (USD) units
    pub total_revenue: f64,
    pub total_courses: u32,
    /// Mean rating across rated courses, two decimals
    pub average_rating: f64,
}

impl InstructorStats {
    pub fn from_courses(courses: &[Course]) -> Self {
        let total_students = courses.iter().map(|c| c.total_students).sum();
        let total_revenue = courses
            .iter()
            .map(|c| c.price * c.total_students as f64)
            .sum::<f64>();

        let rated: Vec<f64> = courses
            .iter()
            .map(|c| c.average_rating)
            .filter(|r| *r > 0.0)
            .collect();
        let average_rating = if rated.is_empty() {
            0.0
        } else {
            (rated.iter().sum::<f64>() / rated.len() as f64 * 100.0).round() / 100.0
        };

        Self {
            total_students,
            total_revenue: (total_revenue * 100.0).round() / 100.0,
            total_courses: courses.len() as u32,
            average_rating,
        }
    }
}
