pub mod account;
pub mod applicant;
pub mod company;
pub mod interview;
pub mod job;
pub mod pagination;
pub mod password_reset;
pub mod session;
pub mod session_access;
pub mod topic;
pub mod user;
