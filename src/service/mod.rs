pub mod access_grant;
pub mod applicant_registration;
pub mod clock;
pub mod email;
pub mod interview_publishing;
pub mod password_reset;
