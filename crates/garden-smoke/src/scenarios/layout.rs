use crate::assertion::Assertion;
use crate::contract::DomContract;
use crate::harness::{Scenario, ScenarioContext};
use crate::result::SmokeResult;
use crate::wait::LoadState;
use async_trait::async_trait;

/// Click through the entry screen (if it is still up) into the navigation shell
#[derive(Debug, Clone, Copy, Default)]
pub struct MainLayoutScenario;

#[async_trait]
impl Scenario for MainLayoutScenario {
    fn id(&self) -> u8 {
        2
    }

    fn name(&self) -> &'static str {
        "main layout"
    }

    fn title(&self) -> &'static str {
        "Main layout"
    }

    fn route(&self, contract: &DomContract) -> String {
        contract.routes.home.clone()
    }

    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> SmokeResult<()> {
        let config = ctx.config;
        let c = &config.contract;

        if Assertion::is_present_and_visible(&*ctx.view, &c.enter_button).await? {
            ctx.view.click(&c.enter_button).await?;
            ctx.view.wait_for_load_state(LoadState::NetworkIdle).await?;
        }
        ctx.capture("02_main_layout").await?;

        let sidebar = Assertion::is_visible(&*ctx.view, &c.sidebar).await?;
        ctx.recorder.check(
            sidebar,
            "main layout sidebar visible",
            self.name(),
            "sidebar not found after entering",
        );
        Ok(())
    }
}
