//! The garden scenario library.
//!
//! One module per application surface, in the order they run. Every
//! selector, route and fixture comes from the configured
//! [`DomContract`](crate::DomContract); the labels recorded here are the
//! report's vocabulary.

mod bulletin;
mod entry;
mod games;
mod layout;
mod mobile;
mod post_detail;
mod posts;
mod search;

pub use bulletin::BulletinScenario;
pub use entry::WelcomeScenario;
pub use games::GamesScenario;
pub use layout::MainLayoutScenario;
pub use mobile::MobileScenario;
pub use post_detail::PostDetailScenario;
pub use posts::PostsScenario;
pub use search::SearchScenario;

use crate::harness::Scenario;

/// The eight scenarios in run order
#[must_use]
pub fn standard() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(WelcomeScenario),
        Box::new(MainLayoutScenario),
        Box::new(PostsScenario),
        Box::new(SearchScenario),
        Box::new(PostDetailScenario),
        Box::new(BulletinScenario),
        Box::new(GamesScenario),
        Box::new(MobileScenario),
    ]
}
