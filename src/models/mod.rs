// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Mentee, Mentor, Assignment, CapacityPolicy, Pairing, StoredAssignment};
pub use requests::{ReconcileRequest, SavePairingsRequest};
pub use responses::{RunResponse, SavePairingsResponse, AssignmentView, AssignmentsResponse, HealthResponse, ErrorResponse};
