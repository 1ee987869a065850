use crate::assertion::Assertion;
use crate::contract::DomContract;
use crate::harness::{Scenario, ScenarioContext};
use crate::result::SmokeResult;
use async_trait::async_trait;

/// Search filter: a known query narrows the listing, a nonsense one shows
/// the no-matches message
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchScenario;

#[async_trait]
impl Scenario for SearchScenario {
    fn id(&self) -> u8 {
        4
    }

    fn name(&self) -> &'static str {
        "posts search"
    }

    fn title(&self) -> &'static str {
        "Posts search"
    }

    fn route(&self, contract: &DomContract) -> String {
        contract.routes.posts.clone()
    }

    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> SmokeResult<()> {
        let config = ctx.config;
        let c = &config.contract;
        ctx.open(&c.routes.posts).await?;

        ctx.view.fill(&c.search_input, &c.search_hit).await?;
        ctx.settle(config.timing.search_settle_ms).await;
        ctx.capture("04_posts_search").await?;

        let hits = Assertion::count(&*ctx.view, &c.post_card).await?;
        ctx.recorder.check(
            hits >= 1,
            format!("posts: search '{}' returns {hits} result(s)", c.search_hit),
            "posts: search filter",
            format!("no results for '{}'", c.search_hit),
        );

        ctx.view.fill(&c.search_input, &c.search_miss).await?;
        ctx.settle(config.timing.search_settle_ms).await;

        let message = Assertion::count(&*ctx.view, &c.no_matches).await?;
        let fragment = c.no_matches.has_text.as_deref().unwrap_or("matches");
        ctx.recorder.check(
            message > 0,
            format!("posts: empty search shows 'no {fragment}' message"),
            "posts: empty-search message",
            "not found",
        );
        Ok(())
    }
}
