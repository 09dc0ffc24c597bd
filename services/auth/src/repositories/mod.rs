//! Repositories for user persistence

pub mod memory;
pub mod user;

pub use memory::InMemoryUserRepository;
pub use user::{UserRepository, UserStore};
