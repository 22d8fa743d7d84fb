mod health;
mod job_status;
mod submit;

pub use health::health_handler;
pub use job_status::job_status_handler;
pub use submit::submit_handler;
