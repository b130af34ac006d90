use bigdecimal::{BigDecimal, Zero};
use tracing::info;

use crate::database::filter::Condition;
use crate::database::{to_fields, Collection};
use crate::error::ServiceError;
use crate::records::{CourseEnrollment, OrderStatus};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Course {
    pub key: &'static str,
    pub title: &'static str,
    pub trainer: &'static str,
    pub starts: &'static str,
    pub description: &'static str,
}

pub const COURSES: [Course; 2] = [
    Course {
        key: "cybersecurity",
        title: "Fundamentals of Cybersecurity",
        trainer: "Oday Jadallah",
        starts: "Starts in 15 minutes",
        description: "Live session covering cybersecurity basics and personal information security.",
    },
    Course {
        key: "medical",
        title: "Medical Preparation Course",
        trainer: "Dr. Rashid Halabiya",
        starts: "Starts in 30 minutes",
        description: "Comprehensive medical course session with Q&A.",
    },
];

// shown for stream links that name no known course
const LIVE_SESSION: Course = Course {
    key: "",
    title: "Live Learning Session",
    trainer: "Expert Trainer",
    starts: "Starting soon",
    description: "Join our interactive live learning session.",
};

pub fn find(key: &str) -> Option<&'static Course> {
    COURSES.iter().find(|course| course.key == key)
}

pub fn stream_info(key: &str) -> Course {
    find(key).copied().unwrap_or(LIVE_SESSION)
}

/// Enrollment is free and recorded once per user and course.
pub fn enroll(session: &Session, key: &str) -> Result<CourseEnrollment, ServiceError> {
    let course = find(key).ok_or_else(|| ServiceError::NotFound("course".to_string()))?;
    let repo = session.repository();
    let existing = repo.query(
        Collection::CourseEnrollments,
        &[Condition::eq("userId", session.user_id()), Condition::eq("course", course.key)],
    )?;
    if !existing.is_empty() {
        return Err(ServiceError::Conflict(format!("Already enrolled in {}", course.title)));
    }
    let enrollment = CourseEnrollment {
        id: String::new(),
        user_id: session.user_id().to_string(),
        course: course.key.to_string(),
        course_title: course.title.to_string(),
        cost: BigDecimal::zero(),
        status: OrderStatus::Confirmed,
        created_at: None,
    };
    let enrollment: CourseEnrollment = repo
        .create(Collection::CourseEnrollments, to_fields(&enrollment)?)?
        .decode()?;
    info!(user_id = session.user_id(), course = course.key, "enrolled");
    Ok(enrollment)
}
