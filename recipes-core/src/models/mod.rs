//! Documents stored by the Identity and Recipes services

mod recipe;
mod role;
mod user;

pub use recipe::{Recipe, RecipeDraft};
pub use role::Role;
pub use user::{User, UserDraft};
