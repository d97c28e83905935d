// Test doubles for the crawl pipeline.
//
// MockFetcher answers registered URLs with canned HTML or a canned failure;
// unregistered URLs fail with a network error. The fixture builders produce
// landing pages shaped like the ones the strategy cascades target.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::fetcher::{FetchError, PageFetcher};

enum MockResponse {
    Page(String),
    Timeout,
    Status(u16),
}

/// HashMap-based page fetcher.
/// Builder pattern: `.on_page()`, `.on_timeout()`, `.on_status()`, `.with_delay()`.
pub struct MockFetcher {
    responses: HashMap<String, MockResponse>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn on_page(mut self, url: &str, html: &str) -> Self {
        self.responses
            .insert(url.to_string(), MockResponse::Page(html.to_string()));
        self
    }

    pub fn on_timeout(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), MockResponse::Timeout);
        self
    }

    pub fn on_status(mut self, url: &str, status: u16) -> Self {
        self.responses
            .insert(url.to_string(), MockResponse::Status(status));
        self
    }

    /// Sleep before answering, to hold a session open in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches served so far, failures included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.responses.get(url) {
            Some(MockResponse::Page(html)) => Ok(html.clone()),
            Some(MockResponse::Timeout) => Err(FetchError::Timeout(Duration::from_secs(10))),
            Some(MockResponse::Status(status)) => Err(FetchError::Status {
                status: *status,
                url: url.to_string(),
            }),
            None => Err(FetchError::Network(format!("no mock registered for {url}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixture pages
// ---------------------------------------------------------------------------

/// A `.swiper-slide` with an image and a caption.
pub fn slide(class: &str, src: &str, caption: &str) -> String {
    format!(r#"<div class="swiper-slide {class}"><img src="{src}"><p>{caption}</p></div>"#)
}

/// Delta Force landing page with operators, one map tab and weapon slides.
pub fn delta_page() -> String {
    let operators: String = [("/p4/weilong.png", "威龙"), ("/p4/fengyi.png", "蜂医")]
        .iter()
        .map(|(src, name)| slide("", src, name))
        .collect();
    let weapons: String = [("/p5/m4.png", "M4A1"), ("/p5/ak.png", "AK-12")]
        .iter()
        .map(|(src, name)| slide("p5-bq", src, name))
        .collect();

    format!(
        r#"<html><body>
        <div class="swiper p4-thumbs"><div class="swiper-wrapper">{operators}</div></div>
        <div class="swiper p5"><div class="swiper-wrapper">{weapons}</div></div>
        <img class="map_bg" data-pc-src="//game.gtimg.cn/df/p7-m1.jpg">
        <div class="swiper p7_tab p7_tab1"><div class="swiper-wrapper">
            <div class="swiper-slide"><p>烽火地带</p></div>
            <div class="swiper-slide"><p>零号大坝</p></div>
        </div></div>
        </body></html>"#
    )
}

/// Naraka landing page with hero, map and weapon image blocks.
pub fn yjwujian_page() -> String {
    r#"<html><body>
    <div class="hero">
        <img src="/heroes/hutao.png" alt="胡桃">
        <img src="/heroes/ningh.png" alt="宁红夜">
    </div>
    <div class="map">
        <img src="/maps/morus.png" alt="聚窟洲">
    </div>
    <div class="weapon">
        <img src="https://cdn.yjwujian.cn/w/changjian.png" alt="长剑">
        <img src="/w/taidao.png" alt="太刀">
    </div>
    </body></html>"#
        .to_string()
}
