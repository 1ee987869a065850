use crate::assertion::Assertion;
use crate::contract::DomContract;
use crate::harness::{Scenario, ScenarioContext};
use crate::result::SmokeResult;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Reduced posts checks in a narrow viewport of its own.
///
/// The mobile context is opened here and closed here exactly once, whether
/// the checks complete, abort or panic.
#[derive(Debug, Clone, Copy, Default)]
pub struct MobileScenario;

#[async_trait]
impl Scenario for MobileScenario {
    fn id(&self) -> u8 {
        8
    }

    fn name(&self) -> &'static str {
        "mobile"
    }

    fn title(&self) -> &'static str {
        "Mobile responsiveness"
    }

    fn route(&self, contract: &DomContract) -> String {
        contract.routes.posts.clone()
    }

    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> SmokeResult<()> {
        let config = ctx.config;
        let mut mobile = ctx.contexts.open_view(config.viewports.mobile).await?;

        let checked = {
            let mut inner = ScenarioContext {
                view: &mut *mobile,
                contexts: ctx.contexts,
                recorder: &mut *ctx.recorder,
                evidence: ctx.evidence,
                config,
            };
            AssertUnwindSafe(check_posts(&mut inner)).catch_unwind().await
        };
        let closed = mobile.close().await;
        match checked {
            Ok(result) => {
                result?;
                closed
            }
            Err(payload) => {
                if let Err(e) = closed {
                    tracing::warn!(error = %e, "mobile context close failed");
                }
                std::panic::resume_unwind(payload)
            }
        }
    }
}

async fn check_posts(ctx: &mut ScenarioContext<'_>) -> SmokeResult<()> {
    let config = ctx.config;
    let c = &config.contract;
    let width = ctx.view.viewport().width;
    ctx.open(&c.routes.posts).await?;
    ctx.capture("08_mobile_posts").await?;

    let search = Assertion::is_visible(&*ctx.view, &c.search_input).await?;
    ctx.recorder.check(
        search,
        format!("mobile: posts search input visible at {width}px"),
        "mobile: search input",
        format!("not visible at {width}px"),
    );

    let cards = Assertion::count(&*ctx.view, &c.post_card).await?;
    ctx.recorder.check(
        cards > 0,
        format!("mobile: {cards} post card(s) visible at {width}px"),
        "mobile: post cards",
        format!("none visible at {width}px"),
    );
    Ok(())
}
