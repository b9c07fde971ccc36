pub mod admin_setting;
pub mod client;
pub mod department;
pub mod input;
pub mod job;
pub mod job_counter;
pub mod job_item;
pub mod user;
