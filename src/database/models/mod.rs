pub mod category;
pub mod post;
pub mod user;

pub use category::{Category, CategoryDetail};
pub use post::PostDetail;
pub use user::{User, UserRead};
