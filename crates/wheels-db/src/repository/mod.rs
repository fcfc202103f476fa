//! # Repository Module
//!
//! Database repository implementations for Wheels Rental.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler / BookingService                                         │
//! │       │                                                                 │
//! │       │  db.cars().list(&filter)                                       │
//! │       │  RentalRepository::blocking_overlaps(&mut *tx, car, range)     │
//! │       ▼                                                                 │
//! │  Repository                                                            │
//! │  ├── &self methods run on the pool                                     │
//! │  └── executor-generic fns run on the pool OR an open transaction       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`car::CarRepository`] - Catalog CRUD and filtering
//! - [`user::UserRepository`] - Accounts and credentials
//! - [`cart::CartRepository`] - Cart entries
//! - [`rental::RentalRepository`] - Rentals, overlap lookups, status writes
//! - [`feedback::FeedbackRepository`] - Ratings and comments

pub mod car;
pub mod cart;
pub mod feedback;
pub mod rental;
pub mod user;
