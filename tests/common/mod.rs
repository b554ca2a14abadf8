//! Scripted in-memory portal driver for pipeline tests.
//!
//! Listing pages are a fixed sequence advanced by clicking the next-page
//! control; detail pages are a URL → HTML map. Every interaction is
//! journaled so tests can assert on what the loops actually did.

// Each test binary uses a subset of this module.
#![allow(dead_code)]

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashMap;

use school_scout::domain::{ScrapeError, ScrapeResult};
use school_scout::infrastructure::PortalDriver;

pub struct ScriptedDriver {
    listing_pages: Vec<String>,
    detail_pages: HashMap<String, String>,
    next_selector: String,
    position: usize,
    viewing_detail: Option<String>,
    pub fail_next_click: bool,
    pub navigations: Vec<String>,
    pub clicks: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub keys: Vec<(String, String)>,
    pub closed: bool,
}

impl ScriptedDriver {
    pub fn with_listing(pages: Vec<String>, next_selector: &str) -> Self {
        Self {
            listing_pages: pages,
            detail_pages: HashMap::new(),
            next_selector: next_selector.to_string(),
            position: 0,
            viewing_detail: None,
            fail_next_click: false,
            navigations: Vec::new(),
            clicks: Vec::new(),
            typed: Vec::new(),
            keys: Vec::new(),
            closed: false,
        }
    }

    pub fn with_details(details: &[(&str, String)]) -> Self {
        let mut driver = Self::with_listing(Vec::new(), "");
        driver.detail_pages = details
            .iter()
            .map(|(url, html)| (url.to_string(), html.clone()))
            .collect();
        driver
    }

    fn current_html(&self) -> &str {
        if let Some(html) = &self.viewing_detail {
            html
        } else {
            self.listing_pages
                .get(self.position)
                .map(String::as_str)
                .unwrap_or("")
        }
    }

    fn selector_hit(&self, selector: &str) -> bool {
        let Ok(compiled) = Selector::parse(selector) else {
            return false;
        };
        Html::parse_document(self.current_html())
            .select(&compiled)
            .next()
            .is_some()
    }
}

#[async_trait]
impl PortalDriver for ScriptedDriver {
    async fn navigate(&mut self, url: &str) -> ScrapeResult<()> {
        self.navigations.push(url.to_string());
        if let Some(html) = self.detail_pages.get(url) {
            self.viewing_detail = Some(html.clone());
            Ok(())
        } else if !self.listing_pages.is_empty() {
            self.viewing_detail = None;
            self.position = 0;
            Ok(())
        } else {
            Err(ScrapeError::navigation(url, "no scripted page"))
        }
    }

    async fn wait_for(&mut self, selector: &str) -> ScrapeResult<bool> {
        Ok(self.selector_hit(selector))
    }

    async fn click(&mut self, selector: &str) -> ScrapeResult<()> {
        self.clicks.push(selector.to_string());
        if selector == self.next_selector {
            if self.fail_next_click {
                return Err(ScrapeError::Session("scripted click failure".to_string()));
            }
            if self.position + 1 < self.listing_pages.len() {
                self.position += 1;
            }
        }
        Ok(())
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> ScrapeResult<()> {
        self.typed.push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn press_key(&mut self, selector: &str, key: &str) -> ScrapeResult<()> {
        self.keys.push((selector.to_string(), key.to_string()));
        Ok(())
    }

    async fn page_html(&mut self) -> ScrapeResult<String> {
        Ok(self.current_html().to_string())
    }

    async fn current_url(&mut self) -> ScrapeResult<String> {
        Ok(self.navigations.last().cloned().unwrap_or_default())
    }

    async fn close(&mut self) -> ScrapeResult<()> {
        self.closed = true;
        Ok(())
    }
}

/// Render a listing page in the txschools table shape.
pub fn listing_page(rows: &[(&str, &str, &str)], next_enabled: Option<bool>) -> String {
    let mut body = String::new();
    for (name, url, grades) in rows {
        body.push_str(&format!(
            "<tr>\
               <td><a href=\"{url}\">{name}</a></td>\
               <td><a href=\"/districts/1\">Test ISD</a></td>\
               <td><div>{name} Rd, Austin, TX</div></td>\
               <td>{grades}</td>\
             </tr>"
        ));
    }

    let next_button = match next_enabled {
        Some(true) => {
            "<button aria-label=\"Go to next page\" class=\"MuiButtonBase-root\">›</button>"
        }
        Some(false) => {
            "<button aria-label=\"Go to next page\" class=\"MuiButtonBase-root Mui-disabled\">›</button>"
        }
        None => "",
    };

    format!(
        "<html><body>\
           <input placeholder=\"Select a grade level\">\
           <table><tbody>{body}</tbody></table>\
           {next_button}\
         </body></html>"
    )
}

/// Render a detail page in the txschools profile shape.
pub fn detail_page(phone: Option<&str>, website: Option<&str>) -> String {
    let phone = phone
        .map(|p| format!("<span>PHONE:</span> {p}"))
        .unwrap_or_default();
    let website = website
        .map(|w| format!("<a class=\"MuiButtonBase-root\" href=\"{w}\">Visit website</a>"))
        .unwrap_or_default();
    format!("<html><body><div class=\"jss16\">{phone} {website}</div></body></html>")
}
