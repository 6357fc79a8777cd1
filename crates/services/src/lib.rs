pub mod codegen;
pub mod dao;
pub mod invites;
pub mod onboarding;

pub use invites::InviteService;
pub use onboarding::OnboardingService;
pub use dao::*;
