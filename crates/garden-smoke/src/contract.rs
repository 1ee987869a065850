//! The DOM contract between the harness and the garden site.
//!
//! Every route, selector, literal UI text fragment and fixture value the
//! scenarios rely on lives in [`DomContract`]. When the site's markup or
//! copy changes, this table (or the `contract:` section of a config file)
//! is the one place to update.

use crate::locator::Selector;
use serde::{Deserialize, Serialize};

/// Current contract version
pub const CONTRACT_VERSION: u32 = 1;

/// Application routes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    /// Entry screen
    pub home: String,
    /// Post listing
    pub posts: String,
    /// Bulletin feed
    pub bulletin: String,
    /// Games accordion
    pub games: String,
    /// Post id used for the detail view
    pub sample_post_id: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            home: "/".to_string(),
            posts: "/posts".to_string(),
            bulletin: "/bulletin".to_string(),
            games: "/games".to_string(),
            sample_post_id: "1".to_string(),
        }
    }
}

impl Routes {
    /// Route of the sample post's detail page
    #[must_use]
    pub fn post_detail(&self) -> String {
        format!("{}/{}", self.posts.trim_end_matches('/'), self.sample_post_id)
    }
}

/// Selectors, text fragments and fixtures for the garden site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomContract {
    /// Contract version
    pub version: u32,
    /// Application routes
    pub routes: Routes,

    /// Control that leaves the entry screen
    pub enter_button: Selector,
    /// Navigation shell sidebar
    pub sidebar: Selector,
    /// Search box on the posts and bulletin pages
    pub search_input: Selector,
    /// Tag filter pills
    pub tag_pill: Selector,
    /// Date archive widget
    pub archive_widget: Selector,
    /// Post card in the listing
    pub post_card: Selector,
    /// Like button
    pub like_button: Selector,
    /// Message shown when a search has no hits
    pub no_matches: Selector,

    /// Post title on the detail page
    pub post_title: Selector,
    /// Rendered markdown paragraphs
    pub markdown_paragraph: Selector,
    /// Tag chips in the post header
    pub header_tag: Selector,
    /// View counter
    pub view_counter: Selector,
    /// Link back to the listing
    pub back_link: Selector,

    /// Bulletin entry
    pub bulletin_entry: Selector,
    /// Pagination control
    pub load_more: Selector,

    /// Collapsible game section
    pub game_section: Selector,
    /// Header of the section guarded against the catch-game crash
    pub catch_game_header: Selector,
    /// Rendering surface of an opened game
    pub game_canvas: Selector,

    /// Query known to match at least one post
    pub search_hit: String,
    /// Query known to match nothing
    pub search_miss: String,
    /// Minimum number of game sections
    pub min_game_sections: usize,
}

impl Default for DomContract {
    fn default() -> Self {
        Self {
            version: CONTRACT_VERSION,
            routes: Routes::default(),
            enter_button: Selector::css("button").with_text("entrar"),
            sidebar: Selector::css(".sideTitle, .gardenSidebar"),
            search_input: Selector::css(".searchInput"),
            tag_pill: Selector::css(".tagPill"),
            archive_widget: Selector::css(".archiveWidget"),
            post_card: Selector::css(".postCard"),
            like_button: Selector::css(".likeBtn"),
            no_matches: Selector::css(".tinyText").with_text("coincidan"),
            post_title: Selector::css(".card h1"),
            markdown_paragraph: Selector::css(".markdownContent p"),
            header_tag: Selector::css(".pageHeader .postCardTag"),
            view_counter: Selector::css(".postViews"),
            back_link: Selector::css(".backLink"),
            bulletin_entry: Selector::css(".bulletinEntry"),
            load_more: Selector::css(".loadMoreBtn"),
            game_section: Selector::css(".shSection"),
            catch_game_header: Selector::css(".shHeader").with_text("catch game"),
            game_canvas: Selector::css("canvas"),
            search_hit: "primer".to_string(),
            search_miss: "xyznoexiste123".to_string(),
            min_game_sections: 20,
        }
    }
}
