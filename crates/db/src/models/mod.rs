pub mod invitation;
pub mod member;
pub mod role;

pub use invitation::Invitation;
pub use member::Member;
pub use role::RoleType;
