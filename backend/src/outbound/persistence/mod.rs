//! In-process persistence adapters for the record repositories.
//!
//! Each adapter keeps its rows in a [`MemoryTable`]: an ordered map behind a
//! tokio `RwLock` plus a monotonically increasing identity sequence.
//! Uniqueness is checked under the write lock, so two racing writers cannot
//! both store the same folded value.
//!
//! # Example
//!
//! ```
//! use staffing::outbound::persistence::MemoryEmployeeRepository;
//!
//! let repository = MemoryEmployeeRepository::default();
//! # let _ = repository;
//! ```

mod memory_department_repository;
mod memory_employee_repository;
mod memory_project_store;
mod table;

pub use memory_department_repository::MemoryDepartmentRepository;
pub use memory_employee_repository::MemoryEmployeeRepository;
pub use memory_project_store::MemoryProjectStore;
