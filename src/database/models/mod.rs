pub mod book;
pub mod product;
pub mod review;
pub mod user;

pub use book::{Book, BookPatch, NewBook};
pub use product::{NewProduct, Product, ProductPatch};
pub use review::{NewReview, Review, ReviewPatch};
pub use user::{NewUser, User, UserPatch};
