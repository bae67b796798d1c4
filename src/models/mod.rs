// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod course;
pub mod dashboard;
pub mod decimal;
pub mod payment;
pub mod user;

pub use course::{
    Category, Course, CourseDetail, CourseFilter, CourseList, CourseQuery, Enrollment,
    NewCourse, PriceBand, SearchFilters,
};
pub use dashboard::{InstructorStats, StudentStats};
pub use payment::{
    InitiatedPayment, PaymentInitiation, PaymentInstructions, PaymentStatusReport,
    PhoneValidation, Provider, ProviderKind, Transaction, TransactionStatus,
};
pub use user::{
    AuthResponse, LoginCredentials, ProfileUpdate, RegisterData, RegisterResponse, Session,
    User, UserRole,
};
