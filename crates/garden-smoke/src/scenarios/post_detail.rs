use crate::assertion::{preview, Assertion};
use crate::contract::DomContract;
use crate::harness::{Scenario, ScenarioContext};
use crate::result::SmokeResult;
use async_trait::async_trait;

/// Characters of the post title shown in the pass label
const TITLE_PREVIEW_CHARS: usize = 30;

/// Detail view of the sample post
#[derive(Debug, Clone, Copy, Default)]
pub struct PostDetailScenario;

#[async_trait]
impl Scenario for PostDetailScenario {
    fn id(&self) -> u8 {
        5
    }

    fn name(&self) -> &'static str {
        "post detail page"
    }

    fn title(&self) -> &'static str {
        "Post detail page"
    }

    fn route(&self, contract: &DomContract) -> String {
        contract.routes.post_detail()
    }

    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> SmokeResult<()> {
        let config = ctx.config;
        let c = &config.contract;
        ctx.open(&c.routes.post_detail()).await?;
        ctx.capture("05_post_detail").await?;

        if Assertion::is_visible(&*ctx.view, &c.post_title).await? {
            let title = Assertion::text_content(&*ctx.view, &c.post_title)
                .await?
                .unwrap_or_default();
            ctx.recorder.record_pass(format!(
                "post detail: title visible - '{}'",
                preview(&title, TITLE_PREVIEW_CHARS)
            ));
        } else {
            ctx.recorder
                .record_fail("post detail: title", "not visible");
        }

        let paragraphs = Assertion::count(&*ctx.view, &c.markdown_paragraph).await?;
        ctx.recorder.check(
            paragraphs > 0,
            format!("post detail: markdown rendered ({paragraphs} paragraphs)"),
            "post detail: markdown",
            format!("no match for {}", c.markdown_paragraph),
        );

        let like = Assertion::is_visible(&*ctx.view, &c.like_button).await?;
        ctx.recorder.check(
            like,
            "post detail: like button visible",
            "post detail: like button",
            "not found",
        );

        let chips = Assertion::count(&*ctx.view, &c.header_tag).await?;
        ctx.recorder.check(
            chips > 0,
            format!("post detail: {chips} tag chip(s) in header"),
            "post detail: tags",
            "none in header",
        );

        // the counter is filled in asynchronously; only its presence is checked
        ctx.settle(config.timing.view_counter_settle_ms).await;
        if Assertion::count(&*ctx.view, &c.view_counter).await? > 0 {
            let text = Assertion::text_content(&*ctx.view, &c.view_counter)
                .await?
                .unwrap_or_default();
            ctx.recorder
                .record_pass(format!("post detail: view counter exists ('{text}')"));
        } else {
            ctx.recorder.record_fail(
                "post detail: view counter",
                format!("{} not in DOM", c.view_counter),
            );
        }

        let back = Assertion::is_visible(&*ctx.view, &c.back_link).await?;
        ctx.recorder.check(
            back,
            "post detail: back link present",
            "post detail: back link",
            "not found",
        );
        Ok(())
    }
}
