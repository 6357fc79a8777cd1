pub mod base;
pub mod invitation;
pub mod member;

pub use base::BaseDao;
