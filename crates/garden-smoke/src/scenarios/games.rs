//! Games accordion and the catch-game regression guard.
//!
//! Opening the catch-game section used to crash the page. The guard opens
//! it, expects its canvas to show up, and watches for uncaught script
//! errors from the click through the observation window.

use crate::assertion::Assertion;
use crate::contract::DomContract;
use crate::harness::{Scenario, ScenarioContext};
use crate::result::SmokeResult;
use async_trait::async_trait;

/// Games accordion
#[derive(Debug, Clone, Copy, Default)]
pub struct GamesScenario;

#[async_trait]
impl Scenario for GamesScenario {
    fn id(&self) -> u8 {
        7
    }

    fn name(&self) -> &'static str {
        "games page"
    }

    fn title(&self) -> &'static str {
        "Games page"
    }

    fn route(&self, contract: &DomContract) -> String {
        contract.routes.games.clone()
    }

    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> SmokeResult<()> {
        let config = ctx.config;
        let c = &config.contract;
        ctx.open(&c.routes.games).await?;
        ctx.capture("07_games_page").await?;

        let sections = Assertion::count(&*ctx.view, &c.game_section).await?;
        let enough = Assertion::at_least(sections, c.min_game_sections);
        ctx.recorder.check(
            enough.passed,
            format!("games: {sections} game sections in accordion"),
            "games: accordion sections",
            enough.message,
        );

        if Assertion::count(&*ctx.view, &c.catch_game_header).await? == 0 {
            ctx.recorder.record_fail(
                "games: CatchGame header",
                "could not find 'catch game' section",
            );
            return Ok(());
        }

        ctx.view.arm_error_capture().await?;
        ctx.view.click(&c.catch_game_header).await?;
        ctx.settle(config.timing.accordion_settle_ms).await;
        ctx.capture("07b_catch_game_open").await?;

        let canvas = Assertion::is_visible(&*ctx.view, &c.game_canvas).await?;
        ctx.recorder.check(
            canvas,
            "games: CatchGame opens and canvas renders",
            "games: CatchGame canvas",
            "canvas not visible after opening",
        );

        ctx.settle(config.timing.error_window_ms).await;
        let errors = ctx.view.drain_page_errors().await?;
        let clean = Assertion::no_page_errors(&errors);
        ctx.recorder.check(
            clean.passed,
            "games: no JS errors after opening CatchGame",
            "games: JS errors",
            clean.message,
        );
        Ok(())
    }
}
