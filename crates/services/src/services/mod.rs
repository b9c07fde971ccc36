pub mod client_review;
pub mod database_validator;
pub mod job_numbers;
pub mod password;
pub mod performance;
pub mod storage;
