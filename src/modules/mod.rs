pub mod cocktail;
pub mod ingredient;

mod router;
pub use router::get_router;
