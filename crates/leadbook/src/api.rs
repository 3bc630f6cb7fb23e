//! Typed operations over the backend REST surface.
//!
//! Each operation checks the session first: administrator-only actions fail
//! with [`AppError::Forbidden`] and signed-out sessions with
//! [`AppError::NotSignedIn`], in both cases before anything is sent.
//! Form rules from the engine run before the network too.

use std::sync::Arc;

use api_types::{
    Data,
    auth::{ForgotPassword, ResetPassword, Role, SignIn, SignedIn, VerifyOtp},
    course::CourseNew,
    enquiry::{EnquiryRange, StudentsUpload},
    staff::{Member, MemberNew},
};
use chrono::{DateTime, Utc};
use engine::{
    Course, CourseCatalog, Enquiry, Money, Payment, ReportWindow, Transition, credentials,
    validate,
};

use crate::{
    error::{AppError, Result},
    gateway::{Gateway, Request},
    session::{Session, SessionStore},
};

#[derive(Clone)]
pub struct Api {
    gateway: Gateway,
}

impl Api {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.gateway.session()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        credentials::check_sign_in(email, password).into_result()?;
        let request = Request::post("/user/signin").json(&SignIn {
            email: email.trim().to_string(),
            password: password.to_string(),
        })?;
        let response = self.gateway.call(request).await?;
        let signed_in: Data<SignedIn> = response.json()?;
        self.session().sign_in(signed_in.data)
    }

    pub fn sign_out(&self) -> Result<()> {
        self.session().sign_out()
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        credentials::check_email(email).into_result()?;
        let request = Request::post("/user/forgotpassword").json(&ForgotPassword {
            email: email.trim().to_string(),
        })?;
        self.send_for_message(request).await
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<String> {
        credentials::check_otp(email, otp).into_result()?;
        let request = Request::post("/user/verify_otp").json(&VerifyOtp {
            email: email.trim().to_string(),
            otp: otp.trim().to_string(),
        })?;
        self.send_for_message(request).await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<String> {
        credentials::check_reset(email, password, confirm).into_result()?;
        let request = Request::post("/user/reset_password").json(&ResetPassword {
            email: email.trim().to_string(),
            password: password.to_string(),
        })?;
        self.send_for_message(request).await
    }

    /// Enquiries created inside `window`, with derived ledger fields
    /// recomputed locally.
    pub async fn list_enquiries(&self, window: ReportWindow) -> Result<Vec<Enquiry>> {
        self.session().require_signed_in()?;
        let (start, end) = window.query_bounds()?;
        let range = EnquiryRange {
            start_date: start,
            end_date: end,
        };
        let request = Request::get("/enquiries")
            .query("startDate", range.start_date)
            .query("endDate", range.end_date);
        let response = self.gateway.call(request).await?;
        let mut enquiries: Vec<Enquiry> = response.json()?;
        for enquiry in &mut enquiries {
            enquiry.refresh_ledger();
        }
        tracing::debug!(count = enquiries.len(), "enquiries loaded");
        Ok(enquiries)
    }

    pub async fn create_enquiry(&self, draft: &Enquiry) -> Result<String> {
        self.session().require_admin()?;
        validate(draft).into_result()?;
        let request = Request::post("/create-student").json(draft)?;
        self.send_for_message(request).await
    }

    pub async fn update_enquiry(&self, enquiry: &Enquiry) -> Result<String> {
        self.session().require_signed_in()?;
        let id = enquiry.id.as_deref().ok_or(AppError::MissingId)?;
        validate(enquiry).into_result()?;
        let request = Request::put(format!("/student/{id}")).json(enquiry)?;
        self.send_for_message(request).await
    }

    /// Apply `payment` to a copy of `enquiry` and store it.
    ///
    /// The original is left alone if the engine or the backend refuses.
    pub async fn record_payment(&self, enquiry: &Enquiry, payment: Payment) -> Result<Enquiry> {
        let mut updated = enquiry.clone();
        updated.apply_payment(payment)?;
        self.update_enquiry(&updated).await?;
        tracing::info!(
            id = updated.id.as_deref().unwrap_or_default(),
            paid = %updated.paid_amount,
            "payment recorded"
        );
        Ok(updated)
    }

    /// Move a copy of `enquiry` through `transition` and store it.
    pub async fn change_status(
        &self,
        enquiry: &Enquiry,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> Result<Enquiry> {
        let mut updated = enquiry.clone();
        updated.transition(transition, now)?;
        self.update_enquiry(&updated).await?;
        tracing::info!(
            id = updated.id.as_deref().unwrap_or_default(),
            status = ?updated.status,
            "status changed"
        );
        Ok(updated)
    }

    pub async fn import_students(&self, students: Vec<Enquiry>) -> Result<String> {
        self.session().require_admin()?;
        let count = students.len();
        let request = Request::post("/upload-students").json(&StudentsUpload { students })?;
        let message = self.send_for_message(request).await?;
        tracing::info!(count, "students uploaded");
        Ok(message)
    }

    pub async fn list_courses(&self) -> Result<CourseCatalog> {
        self.session().require_signed_in()?;
        let response = self.gateway.call(Request::get("/course")).await?;
        let courses: Data<Vec<Course>> = response.json()?;
        Ok(CourseCatalog::new(courses.data))
    }

    pub async fn add_course(&self, title: &str, fee: Money) -> Result<String> {
        self.session().require_admin()?;
        let course = Course::new(title, fee)?;
        let request = Request::post("/course/add_course").json(&CourseNew {
            title: course.title,
            fee: course.fee,
        })?;
        self.send_for_message(request).await
    }

    pub async fn delete_course(&self, id: &str) -> Result<String> {
        self.session().require_admin()?;
        self.send_for_message(Request::delete(format!("/course/{}", id.trim())))
            .await
    }

    pub async fn list_staff(&self) -> Result<Vec<Member>> {
        self.session().require_signed_in()?;
        let response = self.gateway.call(Request::get("/user/members")).await?;
        let members: Data<Vec<Member>> = response.json()?;
        Ok(members.data)
    }

    pub async fn add_staff(&self, member: &MemberNew) -> Result<String> {
        self.session().require_admin()?;
        let mut errors = credentials::check_sign_in(&member.email, &member.password);
        if member.name.trim().is_empty() {
            errors.insert("name", "Name is required");
        }
        errors.into_result()?;
        let request = Request::post("/user/add_user").json(member)?;
        self.send_for_message(request).await
    }

    pub async fn delete_staff(&self, id: &str) -> Result<String> {
        self.session().require_admin()?;
        self.send_for_message(Request::delete(format!("/user/{}", id.trim())))
            .await
    }

    async fn send_for_message(&self, request: Request) -> Result<String> {
        let response = self.gateway.call(request).await?;
        Ok(response.message())
    }
}

/// Names that can be assigned as attender: staff with the `user` role.
pub fn attender_choices(members: &[Member]) -> Vec<String> {
    members
        .iter()
        .filter(|member| member.role == Role::User)
        .map(|member| member.name.clone())
        .collect()
}
