pub mod complications;
pub mod extract;
pub mod health;
