use crate::assertion::Assertion;
use crate::contract::DomContract;
use crate::harness::{Scenario, ScenarioContext};
use crate::result::SmokeResult;
use async_trait::async_trait;

/// Bulletin feed and its load-more pagination.
///
/// A missing load-more control counts as a pass: every entry is already
/// on the page.
#[derive(Debug, Clone, Copy, Default)]
pub struct BulletinScenario;

#[async_trait]
impl Scenario for BulletinScenario {
    fn id(&self) -> u8 {
        6
    }

    fn name(&self) -> &'static str {
        "bulletin page"
    }

    fn title(&self) -> &'static str {
        "Bulletin page"
    }

    fn route(&self, contract: &DomContract) -> String {
        contract.routes.bulletin.clone()
    }

    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> SmokeResult<()> {
        let config = ctx.config;
        let c = &config.contract;
        ctx.open(&c.routes.bulletin).await?;
        ctx.capture("06_bulletin").await?;

        let search = Assertion::is_visible(&*ctx.view, &c.search_input).await?;
        ctx.recorder.check(
            search,
            "bulletin: search input visible",
            "bulletin: search input",
            "not found",
        );

        let tags = Assertion::count(&*ctx.view, &c.tag_pill).await?;
        ctx.recorder.check(
            tags > 0,
            format!("bulletin: {tags} tag pills"),
            "bulletin: tag pills",
            "none found",
        );

        let initial = Assertion::count(&*ctx.view, &c.bulletin_entry).await?;
        ctx.recorder.check(
            initial > 0,
            format!("bulletin: {initial} entries visible (paginated to {initial})"),
            "bulletin: entries",
            "none found",
        );

        if Assertion::is_present_and_visible(&*ctx.view, &c.load_more).await? {
            ctx.view.click(&c.load_more).await?;
            ctx.settle(config.timing.load_more_settle_ms).await;
            let after = Assertion::count(&*ctx.view, &c.bulletin_entry).await?;
            let grew = Assertion::increased(initial, after);
            ctx.recorder.check(
                grew.passed,
                format!("bulletin: 'load more' works ({initial} -> {after} entries)"),
                "bulletin: load more",
                grew.message,
            );
        } else {
            ctx.recorder
                .record_pass("bulletin: no 'load more' button (all entries already shown)");
        }
        Ok(())
    }
}
