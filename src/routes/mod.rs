pub mod applicant;
pub mod company;
pub mod error;
pub mod health;
pub mod interview;
pub mod job;
pub mod password_reset;
pub mod session_access;
pub mod topic;
pub mod user;
