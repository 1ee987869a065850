//! Entry screen.

use crate::assertion::Assertion;
use crate::contract::DomContract;
use crate::harness::{Scenario, ScenarioContext};
use crate::result::SmokeResult;
use async_trait::async_trait;

/// The entry screen shows its enter control, or the visitor is already past it
#[derive(Debug, Clone, Copy, Default)]
pub struct WelcomeScenario;

#[async_trait]
impl Scenario for WelcomeScenario {
    fn id(&self) -> u8 {
        1
    }

    fn name(&self) -> &'static str {
        "welcome page"
    }

    fn title(&self) -> &'static str {
        "Welcome page"
    }

    fn route(&self, contract: &DomContract) -> String {
        contract.routes.home.clone()
    }

    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> SmokeResult<()> {
        let config = ctx.config;
        let c = &config.contract;
        ctx.open(&c.routes.home).await?;
        ctx.capture("01_welcome").await?;

        if Assertion::is_present_and_visible(&*ctx.view, &c.enter_button).await? {
            ctx.recorder
                .record_pass("welcome page renders with enter button");
        } else if Assertion::is_visible(&*ctx.view, &c.sidebar).await? {
            ctx.recorder
                .record_pass("welcome page (already past entry - sidebar visible)");
        } else {
            ctx.recorder
                .record_fail(self.name(), "no enter button or sidebar found");
        }
        Ok(())
    }
}
