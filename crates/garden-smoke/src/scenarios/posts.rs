use crate::assertion::Assertion;
use crate::contract::DomContract;
use crate::harness::{Scenario, ScenarioContext};
use crate::result::SmokeResult;
use async_trait::async_trait;

/// Post listing: search box, tag pills, archive, cards and like buttons
#[derive(Debug, Clone, Copy, Default)]
pub struct PostsScenario;

#[async_trait]
impl Scenario for PostsScenario {
    fn id(&self) -> u8 {
        3
    }

    fn name(&self) -> &'static str {
        "posts page"
    }

    fn title(&self) -> &'static str {
        "Posts page"
    }

    fn route(&self, contract: &DomContract) -> String {
        contract.routes.posts.clone()
    }

    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> SmokeResult<()> {
        let config = ctx.config;
        let c = &config.contract;
        ctx.open(&c.routes.posts).await?;
        ctx.capture("03_posts_page").await?;

        let search = Assertion::is_present_and_visible(&*ctx.view, &c.search_input).await?;
        ctx.recorder.check(
            search,
            "posts: search input rendered",
            "posts: search input",
            "not found",
        );

        let tags = Assertion::count(&*ctx.view, &c.tag_pill).await?;
        ctx.recorder.check(
            tags > 0,
            format!("posts: tag pills rendered ({tags} tags)"),
            "posts: tag pills",
            "none found",
        );

        let archive = Assertion::is_present_and_visible(&*ctx.view, &c.archive_widget).await?;
        ctx.recorder.check(
            archive,
            "posts: date archive widget rendered",
            "posts: archive widget",
            "not found",
        );

        let cards = Assertion::count(&*ctx.view, &c.post_card).await?;
        ctx.recorder.check(
            cards > 0,
            format!("posts: {cards} post card(s) rendered"),
            "posts: post cards",
            "none found",
        );

        let likes = Assertion::count(&*ctx.view, &c.like_button).await?;
        ctx.recorder.check(
            likes > 0,
            format!("posts: {likes} like button(s) rendered"),
            "posts: like button",
            "not found",
        );
        Ok(())
    }
}
