//! Peer service adapters.
//!
//! Thin HTTP implementations of the `EmployeeDirectory` and
//! `DepartmentDirectory` ports. A 404 on a single fetch means the record is
//! absent; every other failure is reported as a `RemoteReferenceError` and
//! left to the calling service's failure policy.

mod department_directory;
mod employee_directory;
mod peer_client;

pub use department_directory::HttpDepartmentDirectory;
pub use employee_directory::HttpEmployeeDirectory;
