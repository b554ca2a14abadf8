//! Collection-phase scenarios against a scripted portal.

mod common;

use common::{ScriptedDriver, listing_page};
use std::fs;

use school_scout::application::Collector;
use school_scout::domain::{FilterSet, ScrapeError};
use school_scout::infrastructure::CrawlConfig;
use school_scout::portal::TexasPortal;

const NEXT_SELECTOR: &str = "button[aria-label*='Go to next page']";

fn fast_config() -> CrawlConfig {
    CrawlConfig {
        request_delay_ms: 0,
        ..CrawlConfig::default()
    }
}

fn two_page_listing() -> Vec<String> {
    vec![
        listing_page(
            &[
                ("Oak Hill Elementary", "/schools/1/overview", "Prekindergarten - 5"),
                ("Cedar Park High", "/schools/2/overview", "9 - 12"),
                ("Barton Creek Primary", "/schools/3/overview", "Kindergarten - 3"),
            ],
            Some(true),
        ),
        listing_page(
            &[
                ("Travis Middle", "/schools/4/overview", "6 - 8"),
                ("Zilker Elementary", "/schools/5/overview", "Kindergarten - 5"),
                ("Lamar High", "/schools/6/overview", "9 - 12"),
            ],
            Some(false),
        ),
    ]
}

#[tokio::test]
async fn filtered_two_page_run_keeps_three_records_in_page_order() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("schools.csv");

    let collector = Collector::new(TexasPortal::new().unwrap(), fast_config());
    let mut driver = ScriptedDriver::with_listing(two_page_listing(), NEXT_SELECTOR);
    let filters = FilterSet::new(["Kindergarten"]);

    let store = collector
        .run(&mut driver, &filters, &output)
        .await
        .unwrap();

    let names: Vec<_> = store
        .iter()
        .map(|r| r.get("name").unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        ["Oak Hill Elementary", "Barton Creek Primary", "Zilker Elementary"]
    );

    // The filter UI was driven once per label.
    assert_eq!(driver.typed.len(), 1);
    assert_eq!(driver.typed[0].1, "Kindergarten");
    assert_eq!(
        driver.keys.iter().map(|(_, k)| k.as_str()).collect::<Vec<_>>(),
        ["ArrowDown", "Enter"]
    );
    // One page turn.
    assert_eq!(
        driver.clicks.iter().filter(|c| *c == NEXT_SELECTOR).count(),
        1
    );

    // Persisted store matches the returned one: header + 3 rows.
    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "name,url,district,address,grades,phone,website"
    );
    assert!(lines[1].starts_with("Oak Hill Elementary,"));
}

#[tokio::test]
async fn no_filters_collects_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("schools.csv");

    let collector = Collector::new(TexasPortal::new().unwrap(), fast_config());
    let mut driver = ScriptedDriver::with_listing(two_page_listing(), NEXT_SELECTOR);

    let store = collector
        .run(&mut driver, &FilterSet::empty(), &output)
        .await
        .unwrap();

    assert_eq!(store.len(), 6);
    // Empty filter set skips the filter UI entirely.
    assert!(driver.typed.is_empty());
}

#[tokio::test]
async fn duplicate_rows_across_page_turns_collapse() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("schools.csv");

    let pages = vec![
        listing_page(
            &[
                ("Oak Hill Elementary", "/schools/1/overview", "Kindergarten - 5"),
                ("Zilker Elementary", "/schools/5/overview", "Kindergarten - 5"),
            ],
            Some(true),
        ),
        // The grid re-renders the last row of page 1 at the top of page 2.
        listing_page(
            &[
                ("Zilker Elementary", "/schools/5/overview", "Kindergarten - 5"),
                ("Barton Creek Primary", "/schools/3/overview", "Kindergarten - 3"),
            ],
            Some(false),
        ),
    ];

    let collector = Collector::new(TexasPortal::new().unwrap(), fast_config());
    let mut driver = ScriptedDriver::with_listing(pages, NEXT_SELECTOR);

    let store = collector
        .run(&mut driver, &FilterSet::empty(), &output)
        .await
        .unwrap();

    assert_eq!(store.len(), 3);
    let zilkers = store
        .iter()
        .filter(|r| r.get("name") == Some("Zilker Elementary"))
        .count();
    assert_eq!(zilkers, 1);
}

#[tokio::test]
async fn missing_listing_structure_on_first_load_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("schools.csv");

    let collector = Collector::new(TexasPortal::new().unwrap(), fast_config());
    let mut driver = ScriptedDriver::with_listing(
        vec!["<html><body><p>maintenance</p></body></html>".to_string()],
        NEXT_SELECTOR,
    );

    let err = collector
        .run(&mut driver, &FilterSet::empty(), &output)
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::Navigation { .. }));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn broken_later_page_keeps_the_collected_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("schools.csv");

    let pages = vec![
        listing_page(
            &[("Oak Hill Elementary", "/schools/1/overview", "Kindergarten - 5")],
            Some(true),
        ),
        // Page 2 renders without the table; its next control is disabled.
        listing_page(&[], Some(false)),
    ];

    let collector = Collector::new(TexasPortal::new().unwrap(), fast_config());
    let mut driver = ScriptedDriver::with_listing(pages, NEXT_SELECTOR);

    let store = collector
        .run(&mut driver, &FilterSet::empty(), &output)
        .await
        .unwrap();

    assert_eq!(store.len(), 1);
    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(text.lines().count(), 2);
}

#[tokio::test]
async fn failed_next_click_ends_pagination_gracefully() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("schools.csv");

    let collector = Collector::new(TexasPortal::new().unwrap(), fast_config());
    let mut driver = ScriptedDriver::with_listing(two_page_listing(), NEXT_SELECTOR);
    driver.fail_next_click = true;

    let store = collector
        .run(&mut driver, &FilterSet::empty(), &output)
        .await
        .unwrap();

    // Only page 1 made it, and the checkpoint file has exactly that.
    assert_eq!(store.len(), 3);
    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(text.lines().count(), 4);
}

#[tokio::test]
async fn reruns_against_a_stable_listing_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    let filters = FilterSet::new(["Kindergarten"]);

    let collector = Collector::new(TexasPortal::new().unwrap(), fast_config());

    let mut driver = ScriptedDriver::with_listing(two_page_listing(), NEXT_SELECTOR);
    collector.run(&mut driver, &filters, &first).await.unwrap();

    let mut driver = ScriptedDriver::with_listing(two_page_listing(), NEXT_SELECTOR);
    collector.run(&mut driver, &filters, &second).await.unwrap();

    assert_eq!(
        fs::read_to_string(&first).unwrap(),
        fs::read_to_string(&second).unwrap()
    );
}
